use std::ops::AddAssign;

use log::info;

use crate::data::building::ObjectKind;

/// Emitted and skipped buildings. Each bin returns its own and the run adds them up.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    pub buildings: u64,
    pub ways: u64,
    pub relations: u64,
    pub skipped: u64,
}

impl Counters {
    pub fn record(&mut self, kind: ObjectKind) {
        self.buildings += 1;
        match kind {
            ObjectKind::Way => self.ways += 1,
            ObjectKind::Relation => self.relations += 1,
        }
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    /// Share of examined buildings that fell below the area threshold, in percent.
    /// `None` when nothing was examined.
    pub fn skipped_percent(&self) -> Option<f64> {
        let examined = self.buildings + self.skipped;
        if examined == 0 {
            None
        } else {
            Some(100.0 * self.skipped as f64 / examined as f64)
        }
    }

    pub fn summary(&self, filtering: bool) -> String {
        let mut summary = format!(
            "{} buildings ({} ways, {} relations)",
            self.buildings, self.ways, self.relations
        );
        if filtering {
            summary.push_str(&format!(", {} skipped", self.skipped));
            if let Some(percent) = self.skipped_percent() {
                summary.push_str(&format!(" ({:.2}%)", percent));
            }
        }
        summary
    }

    pub fn log_summary(&self, filtering: bool) {
        let summary = self.summary(filtering);
        if filtering {
            info!(
                buildings = self.buildings,
                ways = self.ways,
                relations = self.relations,
                skipped = self.skipped,
                skipped_percent = self.skipped_percent().unwrap_or(0.0);
                "{}", summary
            );
        } else {
            info!(
                buildings = self.buildings,
                ways = self.ways,
                relations = self.relations;
                "{}", summary
            );
        }
    }
}

impl AddAssign for Counters {
    fn add_assign(&mut self, other: Counters) {
        self.buildings += other.buildings;
        self.ways += other.ways;
        self.relations += other.relations;
        self.skipped += other.skipped;
    }
}
