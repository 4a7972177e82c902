use crate::common::{ClassRule, DetectionBox, OutputView};

/// Result of scanning one class row across every anchor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClassScan {
    /// Anchor holding the highest finite confidence, if any.
    pub anchor: Option<usize>,
    /// Highest finite confidence seen, 0 when none.
    pub confidence: f32,
}

/// Highest-confidence box for a class that cleared its threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub class_id: usize,
    pub anchor: usize,
    pub confidence: f32,
    pub bbox: DetectionBox,
}

/// Walks a class row and keeps the maximum. Non-finite values are skipped so a
/// corrupted cell cannot win the scan. Ties keep the lowest anchor.
pub fn scan_class(view: &OutputView, class_id: usize) -> ClassScan {
    let Some(row) = view.class_row(class_id) else {
        return ClassScan::default();
    };

    row.iter()
        .enumerate()
        .filter(|(_, c)| c.is_finite())
        .fold(ClassScan::default(), |best, (i, &c)| {
            if best.anchor.is_none() || c > best.confidence {
                ClassScan { anchor: Some(i), confidence: c }
            } else {
                best
            }
        })
}

/// Best box for `rule`'s class, or `None` when no anchor clears its threshold.
/// The scan is returned either way so callers can report the best score seen.
pub fn best_box(view: &OutputView, rule: &ClassRule) -> (ClassScan, Option<Candidate>) {
    let scan = scan_class(view, rule.class_id);
    let candidate = scan
        .anchor
        .filter(|_| rule.check_conf(scan.confidence))
        .map(|anchor| Candidate {
            class_id: rule.class_id,
            anchor,
            confidence: scan.confidence,
            bbox: view.bbox(anchor),
        });

    log::debug!(
        "class {} ({}): max={:.3} anchor={:?} accepted={}",
        rule.class_id, rule.class_name, scan.confidence, scan.anchor, candidate.is_some()
    );

    (scan, candidate)
}
