//! Voice-Metric Analyzer — pure comparison of running speech-delivery
//! samples against a per-candidate baseline. No session or phase awareness.

use crate::models::session::{VoiceBaseline, VoiceSample};

/// Pace thresholds relative to baseline words-per-minute.
const FAST_TALK_RATIO: f64 = 1.35;
const SLOW_TALK_RATIO: f64 = 0.65;

/// Volume thresholds relative to baseline volume.
const QUIET_RATIO: f64 = 0.5;
const LOUD_RATIO: f64 = 1.5;

const FAST_FEEDBACK: &str = "You spoke much faster than your usual pace. Slowing down will give \
     your answers more weight and make them easier to follow.";
const SLOW_FEEDBACK: &str = "You spoke noticeably slower than your usual pace. A little more \
     energy will help keep the interviewer engaged.";
const PACE_OK_FEEDBACK: &str = "Your speaking pace was comfortable and close to your baseline.";

const QUIET_FEEDBACK: &str = "Your volume was much lower than your baseline. Projecting a bit \
     more will come across as more confident.";
const LOUD_FEEDBACK: &str = "Your volume was much higher than your baseline. Dialing it down \
     slightly will sound more composed.";
const VOLUME_OK_FEEDBACK: &str = "Your volume stayed in a comfortable range.";

/// Classifies mean pace and volume against the baseline and emits the fixed
/// qualitative sentences for each bucket. Returns `None` when there are no
/// samples to analyze.
pub fn analyze(samples: &[VoiceSample], baseline: VoiceBaseline) -> Option<String> {
    if samples.is_empty() {
        return None;
    }

    let n = samples.len() as f64;
    let mean_wpm = samples.iter().map(|s| s.wpm).sum::<f64>() / n;
    let mean_volume = samples.iter().map(|s| s.volume).sum::<f64>() / n;

    let pace_feedback = if baseline.wpm > 0.0 && mean_wpm > baseline.wpm * FAST_TALK_RATIO {
        FAST_FEEDBACK
    } else if baseline.wpm > 0.0 && mean_wpm < baseline.wpm * SLOW_TALK_RATIO {
        SLOW_FEEDBACK
    } else {
        PACE_OK_FEEDBACK
    };

    let volume_feedback = if baseline.volume > 0.0 && mean_volume < baseline.volume * QUIET_RATIO {
        QUIET_FEEDBACK
    } else if baseline.volume > 0.0 && mean_volume > baseline.volume * LOUD_RATIO {
        LOUD_FEEDBACK
    } else {
        VOLUME_OK_FEEDBACK
    };

    Some(format!("{pace_feedback} {volume_feedback}"))
}
