//! Per-frame decode-and-score.
//!
//! One [`AnomalyScorer`] lives for one monitoring session. Calls must be
//! serialized: the debounce counters and box history only mean something
//! under a strict frame order.

mod box_history;
mod debounce;

pub use box_history::BoxHistory;
pub use debounce::DebounceCounter;

use crate::common::{Category, DetectionBox, DetectionVerdict, ScorerConfig};
use crate::detection_processing::{best_box, scan_class};
use crate::error::{DetectError, Result};

#[derive(Debug)]
pub struct AnomalyScorer {
    config: ScorerConfig,
    history: BoxHistory,
    /// One counter per entry of `config.escalations`, same order.
    counters: Vec<DebounceCounter>,
    frame_seq: u64,
}

impl AnomalyScorer {
    pub fn new(config: ScorerConfig) -> Result<Self> {
        config.validate()?;
        let counters = vec![DebounceCounter::new(config.debounce); config.escalations.len()];
        Ok(Self {
            history: BoxHistory::new(config.history_capacity),
            counters,
            frame_seq: 0,
            config,
        })
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Clears history, counters and the frame counter for a new session.
    pub fn reset(&mut self) {
        self.history.clear();
        self.counters.iter_mut().for_each(DebounceCounter::reset);
        self.frame_seq = 0;
        log::info!("Scorer reset");
    }

    /// Frames seen since construction or the last reset. Diagnostic only.
    pub fn frame_seq(&self) -> u64 {
        self.frame_seq
    }

    pub fn history(&self) -> &BoxHistory {
        &self.history
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Current counter value for the escalation reported under `category`.
    pub fn debounce_hits(&self, category: &str) -> Option<u8> {
        self.config
            .escalations
            .iter()
            .position(|r| r.category == category)
            .map(|i| self.counters[i].hits())
    }

    /// Scores one frame's raw detector output.
    ///
    /// Rules run as a priority chain and the first one that fires decides the
    /// verdict: confirmed escalation, no subject, bottom of frame, horizontal
    /// posture, rapid movement. Only a frame where none fires extends the
    /// box history.
    pub fn score(&mut self, raw: &[f32]) -> DetectionVerdict {
        let view = match self.config.layout.view(raw) {
            Ok(view) => view,
            Err(err) => return self.fail(&err),
        };
        self.frame_seq += 1;

        // every counter moves once per frame, then the first confirmed wins
        let mut confirmed = None;
        for (rule, counter) in self.config.escalations.iter().zip(self.counters.iter_mut()) {
            let scan = scan_class(&view, rule.class_id);
            let hit = scan.anchor.is_some() && rule.check_conf(scan.confidence);
            if counter.observe(hit) && confirmed.is_none() {
                confirmed = Some((scan.confidence, rule.category.clone()));
            }
        }
        if let Some((confidence, label)) = confirmed {
            log::info!("frame {}: {} confirmed ({:.2})", self.frame_seq, label, confidence);
            return DetectionVerdict::anomaly(confidence, Category::Escalation(label));
        }

        let (scan, candidate) = best_box(&view, &self.config.primary);
        let Some(primary) = candidate else {
            return DetectionVerdict::none_detected(scan.confidence);
        };
        // a NaN box slips past every comparison and would poison the history
        if !primary.bbox.is_finite() {
            let err = DetectError::NonFiniteBox { anchor: primary.anchor };
            log::warn!("frame {}: degraded, {}", self.frame_seq, err);
            return DetectionVerdict::from_error(&err);
        }

        let verdict = self.apply_rules(&primary.bbox, primary.confidence);
        if verdict.is_anomalous {
            log::info!("frame {}: {} ({:.2})", self.frame_seq, verdict.category, verdict.confidence);
        }
        verdict
    }

    fn apply_rules(&mut self, bbox: &DetectionBox, confidence: f32) -> DetectionVerdict {
        let rules = self.config.rules;

        if bbox.normalized_cy(self.config.input_size) > rules.fall_y_fraction {
            return DetectionVerdict::anomaly(rules.fall_confidence, Category::PersonDown);
        }

        if bbox.aspect_ratio().is_some_and(|ratio| ratio > rules.aspect_ratio) {
            return DetectionVerdict::anomaly(rules.posture_confidence, Category::UnusualPosture);
        }

        let moved = self.history.displacement_from_latest(bbox);
        if moved > rules.displacement_px {
            log::debug!("frame {}: displacement {:.1}px", self.frame_seq, moved);
            return DetectionVerdict::anomaly(rules.movement_confidence, Category::RapidMovement);
        }

        self.history.push(*bbox);
        DetectionVerdict::normal(confidence)
    }

    /// Degrades a frame that could not be scored: every debounce counter
    /// decays one step and a safe verdict comes back.
    pub fn fail(&mut self, err: &DetectError) -> DetectionVerdict {
        self.frame_seq += 1;
        self.counters.iter_mut().for_each(DebounceCounter::decay);
        log::warn!("frame {}: degraded, {}", self.frame_seq, err);
        DetectionVerdict::from_error(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ClassRule, OutputLayout, COCO_KNIFE, COCO_PERSON};
    use crate::detection_processing::tests::synthetic;

    const S: f32 = 640.;

    fn scorer() -> AnomalyScorer {
        AnomalyScorer::new(ScorerConfig::default()).unwrap()
    }

    fn layout() -> OutputLayout {
        OutputLayout::default()
    }

    /// Upright person at `(cx, cy)`, 60x160.
    fn person_at(cx: f32, cy: f32, conf: f32) -> Vec<f32> {
        synthetic(&layout(), 100, (cx, cy, 60., 160.), &[(COCO_PERSON, conf)])
    }

    fn with_knife(mut raw: Vec<f32>, conf: f32) -> Vec<f32> {
        raw[layout().class_offset(COCO_KNIFE, 2000)] = conf;
        raw
    }

    #[test]
    fn upright_person_is_normal_and_recorded() {
        let mut s = scorer();
        let v = s.score(&person_at(320., 300., 0.9));
        assert_eq!(v, DetectionVerdict::normal(0.9));
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.frame_seq(), 1);
    }

    #[test]
    fn no_person_reports_best_score_seen() {
        let mut s = scorer();
        let v = s.score(&person_at(320., 300., 0.3));
        assert!(!v.is_anomalous);
        assert_eq!(v.category, Category::NoneDetected);
        assert_eq!(v.confidence, 0.3);
        assert!(s.history().is_empty());
    }

    #[test]
    fn bottom_of_frame_is_person_down() {
        let mut s = scorer();
        let v = s.score(&person_at(320., 0.9 * S, 0.6));
        assert_eq!(v, DetectionVerdict::anomaly(0.88, Category::PersonDown));
        assert!(s.history().is_empty());
    }

    #[test]
    fn bottom_wins_over_horizontal() {
        let mut s = scorer();
        let raw = synthetic(&layout(), 5, (320., 600., 300., 100.), &[(COCO_PERSON, 0.8)]);
        assert_eq!(s.score(&raw).category, Category::PersonDown);
    }

    #[test]
    fn wide_box_is_unusual_posture() {
        let mut s = scorer();
        let raw = synthetic(&layout(), 5, (320., 300., 200., 100.), &[(COCO_PERSON, 0.8)]);
        assert_eq!(s.score(&raw), DetectionVerdict::anomaly(0.82, Category::UnusualPosture));
    }

    #[test]
    fn rapid_movement_against_latest_box() {
        let mut s = scorer();
        assert!(!s.score(&person_at(100., 200., 0.9)).is_anomalous);
        let v = s.score(&person_at(400., 200., 0.9));
        assert_eq!(v, DetectionVerdict::anomaly(0.78, Category::RapidMovement));
        // the jump was not recorded, so returning is not movement
        assert_eq!(s.history().len(), 1);
        assert!(!s.score(&person_at(110., 210., 0.9)).is_anomalous);
        assert_eq!(s.history().len(), 2);
    }

    #[test]
    fn small_steps_are_not_movement() {
        let mut s = scorer();
        for i in 0..10 {
            let v = s.score(&person_at(100. + i as f32 * 40., 300., 0.9));
            assert!(!v.is_anomalous, "step {i}");
        }
        assert_eq!(s.history_len(), 6);
    }

    #[test]
    fn weapon_confirms_from_second_frame() {
        let mut s = scorer();
        let frame = |c| with_knife(person_at(320., 300., 0.9), c);

        let v1 = s.score(&frame(0.8));
        assert!(!v1.is_anomalous);
        assert_eq!(s.debounce_hits("weapon"), Some(1));

        let v2 = s.score(&frame(0.8));
        assert_eq!(v2, DetectionVerdict::anomaly(0.8, Category::Escalation("weapon".into())));

        let v3 = s.score(&frame(0.1));
        assert_eq!(v3.category, Category::Normal);
        assert_eq!(s.debounce_hits("weapon"), Some(1));
    }

    #[test]
    fn isolated_weapon_frame_never_confirms() {
        let mut s = scorer();
        for conf in [0.1, 0.9, 0.1, 0.1, 0.9, 0.1] {
            let v = s.score(&with_knife(person_at(320., 300., 0.9), conf));
            assert_ne!(v.category.label(), "weapon");
        }
    }

    #[test]
    fn escalation_preempts_geometry() {
        let mut s = scorer();
        let fallen = || with_knife(person_at(320., 0.95 * S, 0.9), 0.9);
        assert_eq!(s.score(&fallen()).category, Category::PersonDown);
        assert_eq!(s.score(&fallen()).category.label(), "weapon");
    }

    #[test]
    fn decode_error_only_decays_counters() {
        let mut s = scorer();
        let frame = with_knife(person_at(320., 300., 0.9), 0.9);
        s.score(&frame);
        s.score(&frame);
        s.score(&frame);
        assert_eq!(s.debounce_hits("weapon"), Some(3));

        let short = vec![1.0; layout().expected_len() - 1];
        let v = s.score(&short);
        assert_eq!(v.category, Category::DecodeError);
        assert!(!v.is_anomalous);
        assert_eq!(v.confidence, 0.);
        assert_eq!(s.debounce_hits("weapon"), Some(2));

        s.score(&[]);
        s.score(&[]);
        s.score(&[]);
        assert_eq!(s.debounce_hits("weapon"), Some(0));
        // confirmed frames return before the history update
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn non_finite_box_is_a_decode_error_and_not_recorded() {
        let mut s = scorer();
        s.score(&person_at(320., 300., 0.9));
        let v = s.score(&person_at(f32::NAN, 300., 0.9));
        assert_eq!(v.category, Category::DecodeError);
        assert!(!v.is_anomalous);
        assert_eq!(s.history_len(), 1);
        // the next jump is still measured against the last good box
        let v = s.score(&person_at(600., 300., 0.9));
        assert_eq!(v.category, Category::RapidMovement);
    }

    #[test]
    fn identical_input_after_reset_gives_identical_verdict() {
        let mut s = scorer();
        let raw = person_at(250., 250., 0.7);
        let first = s.score(&raw);
        s.reset();
        assert_eq!(s.frame_seq(), 0);
        assert_eq!(s.score(&raw), first);
    }

    #[test]
    fn several_escalations_all_update() {
        let cfg = ScorerConfig::new()
            .with_layout(50, 4)
            .with_escalations(vec![
                ClassRule::new(1, "gun", "firearm", 0.5),
                ClassRule::new(2, "knife", "weapon", 0.5),
            ]);
        let layout = cfg.layout;
        let mut s = AnomalyScorer::new(cfg).unwrap();
        let raw = synthetic(&layout, 10, (300., 300., 50., 150.), &[(0, 0.9), (1, 0.7), (2, 0.95)]);
        s.score(&raw);
        let v = s.score(&raw);
        // first configured escalation wins even with a lower score
        assert_eq!(v, DetectionVerdict::anomaly(0.7, Category::Escalation("firearm".into())));
        assert_eq!(s.debounce_hits("weapon"), Some(2));
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(AnomalyScorer::new(ScorerConfig::new().with_history_capacity(0)).is_err());
    }
}
