use serde::{Deserialize, Serialize};
use crate::common::OutputLayout;
use crate::error::{DetectError, Result};

// COCO class indices
pub const COCO_PERSON: usize = 0;
pub const COCO_KNIFE: usize = 43;

/// A class the scorer looks at, with its confidence cutoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRule {
    pub class_id: usize,
    /// Name in the model vocabulary, used by [`ScorerConfig::resolve_labels`].
    pub class_name: String,
    /// Label reported in verdicts when this class confirms.
    pub category: String,
    pub threshold: f32,
}

impl ClassRule {
    pub fn new(class_id: usize, class_name: &str, category: &str, threshold: f32) -> Self {
        Self {
            class_id,
            class_name: class_name.to_string(),
            category: category.to_string(),
            threshold,
        }
    }

    pub fn check_conf(&self, conf: f32) -> bool {
        conf > self.threshold
    }
}

/// Geometric and kinematic cutoffs plus the fixed confidences reported when
/// each rule fires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleThresholds {
    pub fall_y_fraction: f32,
    pub fall_confidence: f32,
    pub aspect_ratio: f32,
    pub posture_confidence: f32,
    pub displacement_px: f32,
    pub movement_confidence: f32,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            fall_y_fraction: 0.75,
            fall_confidence: 0.88,
            aspect_ratio: 1.5,
            posture_confidence: 0.82,
            displacement_px: 150.,
            movement_confidence: 0.78,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Counter ceiling.
    pub max_hits: u8,
    /// Counter value required (together with a current hit) to confirm.
    pub confirm_hits: u8,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            max_hits: 3,
            confirm_hits: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeKind {
    #[default]
    Nearest,
    Bilinear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Square model input size `S`.
    pub input_size: u32,
    pub layout: OutputLayout,
    pub primary: ClassRule,
    pub escalations: Vec<ClassRule>,
    pub rules: RuleThresholds,
    pub debounce: DebounceConfig,
    pub history_capacity: usize,
    pub resize: ResizeKind,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            input_size: 640,
            layout: OutputLayout::default(),
            primary: ClassRule::new(COCO_PERSON, "person", "person", 0.5),
            escalations: vec![ClassRule::new(COCO_KNIFE, "knife", "weapon", 0.5)],
            rules: RuleThresholds::default(),
            debounce: DebounceConfig::default(),
            history_capacity: 6,
            resize: ResizeKind::default(),
        }
    }
}

impl ScorerConfig {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_input_size(mut self, s: u32) -> Self {
        self.input_size = s;
        self
    }

    pub fn with_layout(mut self, num_anchors: usize, num_classes: usize) -> Self {
        self.layout = OutputLayout::new(num_anchors, num_classes);
        self
    }

    pub fn with_primary(mut self, rule: ClassRule) -> Self {
        self.primary = rule;
        self
    }

    pub fn with_escalations(mut self, rules: Vec<ClassRule>) -> Self {
        self.escalations = rules;
        self
    }

    pub fn with_rules(mut self, rules: RuleThresholds) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_debounce(mut self, max_hits: u8, confirm_hits: u8) -> Self {
        self.debounce = DebounceConfig { max_hits, confirm_hits };
        self
    }

    pub fn with_history_capacity(mut self, n: usize) -> Self {
        self.history_capacity = n;
        self
    }

    pub fn with_resize(mut self, kind: ResizeKind) -> Self {
        self.resize = kind;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 {
            return Err(DetectError::Config("input_size must be positive".into()));
        }
        if self.layout.num_anchors == 0 || self.layout.num_classes == 0 {
            return Err(DetectError::Config(format!(
                "layout needs anchors and classes, got {}x{}",
                self.layout.num_anchors, self.layout.num_classes
            )));
        }
        if self.layout.checked_len().is_none() {
            return Err(DetectError::Config(format!(
                "layout {}x{} overflows the output length",
                self.layout.num_anchors, self.layout.num_classes
            )));
        }
        for rule in std::iter::once(&self.primary).chain(self.escalations.iter()) {
            if rule.class_id >= self.layout.num_classes {
                return Err(DetectError::Config(format!(
                    "class '{}' id {} out of range for {} classes",
                    rule.class_name, rule.class_id, self.layout.num_classes
                )));
            }
            if !(0.0..=1.0).contains(&rule.threshold) {
                return Err(DetectError::Config(format!(
                    "class '{}' threshold {} outside [0, 1]",
                    rule.class_name, rule.threshold
                )));
            }
        }
        let d = self.debounce;
        if d.confirm_hits == 0 || d.confirm_hits > d.max_hits {
            return Err(DetectError::Config(format!(
                "debounce confirm_hits {} must be in 1..={}",
                d.confirm_hits, d.max_hits
            )));
        }
        if self.history_capacity == 0 {
            return Err(DetectError::Config("history_capacity must be positive".into()));
        }
        Ok(())
    }

    /// Points every class rule at the index of its `class_name` in `names`.
    /// Rules whose name is missing from the vocabulary are an error.
    pub fn resolve_labels(&mut self, names: &[String]) -> Result<()> {
        for rule in std::iter::once(&mut self.primary).chain(self.escalations.iter_mut()) {
            let id = names
                .iter()
                .position(|n| n.eq_ignore_ascii_case(&rule.class_name))
                .ok_or_else(|| DetectError::Config(format!("label '{}' not in model vocabulary", rule.class_name)))?;
            if id != rule.class_id {
                log::info!("Class '{}' remapped from id {} to {}", rule.class_name, rule.class_id, id);
                rule.class_id = id;
            }
        }
        self.layout.num_classes = names.len();
        Ok(())
    }

    pub fn to_string(&self) -> String {
        format!("Input Resolution: {0}x{0}\n\
        Output Layout: {1} anchors x {2} classes\n\
        Primary: {3} (id {4}) > {5}\n\
        Escalations: {6}\n\
        Debounce: {7}/{8}\n\
        History Capacity: {9}",
                self.input_size, self.layout.num_anchors, self.layout.num_classes,
                self.primary.class_name, self.primary.class_id, self.primary.threshold,
                self.escalations.iter().map(|r| format!("{} (id {}) > {}", r.class_name, r.class_id, r.threshold)).collect::<Vec<_>>().join(", "),
                self.debounce.confirm_hits, self.debounce.max_hits, self.history_capacity)
    }
}
