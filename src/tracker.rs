/*
 * SPDX-FileCopyrightText: 2024 Tommaso Fontana
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Mode-selection state machine driving the per-run core loop.

use crate::partition::Partition;

/// How many bubble steps past the detected peak are tolerated before
/// merging is unlocked.
const POST_PEAK_BUBBLE_LIMIT: u32 = 2;

/// The four update procedures a core-loop step can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// Most-specific-label propagation over a random 90% of nodes.
    Typical,
    /// Split large, poorly-fitting communities.
    Bubble,
    /// Merge well-connected communities.
    Merge,
    /// Most-specific-label propagation over the worst-fitting nodes.
    Nurture,
}

impl Mode {
    fn index(self) -> usize {
        match self {
            Mode::Typical => 0,
            Mode::Bubble => 1,
            Mode::Merge => 2,
            Mode::Nurture => 3,
        }
    }
}

/// Selects the next mode, counts saved partitions, and decides when a run
/// has produced enough of them to terminate.
#[derive(Debug, Clone)]
pub(crate) struct Tracker {
    t: usize,
    last: [u32; 4],
    allowed_to_merge: bool,
    max_prev_merge_threshold: f64,
    bubbling_has_peaked: bool,
    max_labels_after_bubbling: usize,
    post_peak_bubble_steps: u32,
    post_intervention_count: i64,
    n_partitions: usize,
    prev_mode: Option<Mode>,
    prev_step_changed: bool,
    intervention_event: bool,
}

impl Tracker {
    /// `n_partitions` is the target number of post-intervention partitions
    /// to save; `discard_transient` seeds `post_intervention_count` at
    /// `-(discard_transient) + 1` so that many transient intervention
    /// events are absorbed before saving begins.
    #[must_use]
    pub(crate) fn new(n_partitions: usize, discard_transient: usize) -> Self {
        Tracker {
            t: 0,
            last: [0; 4],
            allowed_to_merge: false,
            max_prev_merge_threshold: 0.0,
            bubbling_has_peaked: false,
            max_labels_after_bubbling: 0,
            post_peak_bubble_steps: 0,
            post_intervention_count: -(discard_transient as i64) + 1,
            n_partitions,
            prev_mode: None,
            prev_step_changed: false,
            intervention_event: false,
        }
    }

    /// Pick the mode for the current step, without mutating any state.
    #[must_use]
    pub(crate) fn select_mode(&self) -> Mode {
        if self.t < 20 {
            return Mode::Typical;
        }

        if self.allowed_to_merge {
            if self.last[Mode::Merge.index()] > 1 && self.last[Mode::Bubble.index()] > 3 {
                return Mode::Merge;
            }
        } else if self.last[Mode::Merge.index()] > 2 && self.last[Mode::Bubble.index()] > 14 {
            return Mode::Bubble;
        } else if self.last[Mode::Merge.index()] > 1 && self.last[Mode::Bubble.index()] < 5 {
            return Mode::Nurture;
        }

        Mode::Typical
    }

    /// Whether the tracker would rather the core loop skip actually
    /// running [`crate::labeller::typical_mode`] this step: true only
    /// right after a typical step that changed nothing.
    #[must_use]
    pub(crate) fn skip_typical(&self) -> bool {
        matches!(self.prev_mode, Some(Mode::Typical)) && !self.prev_step_changed
    }

    /// The running merge-improvement high-water mark, threaded through to
    /// [`crate::labeller::merge_well_connected_communities`].
    pub(crate) fn max_prev_merge_threshold(&mut self) -> &mut f64 {
        &mut self.max_prev_merge_threshold
    }

    /// Record the outcome of running (or skipping) `mode` this step.
    /// `changed_or_stable` is the mode procedure's boolean result: "did
    /// anything change" for typical/nurture/bubble, "is the pass stable"
    /// for merge.
    pub(crate) fn post_step_hook(&mut self, mode: Mode, changed_or_stable: bool, partition: &Partition) {
        for counter in &mut self.last {
            *counter += 1;
        }
        self.last[mode.index()] = 0;
        self.intervention_event = false;

        match mode {
            Mode::Bubble => {
                let current = partition.n_labels();
                if !self.bubbling_has_peaked {
                    if current > 2 && self.max_labels_after_bubbling as f64 > 0.9 * current as f64
                    {
                        self.bubbling_has_peaked = true;
                    }
                    self.max_labels_after_bubbling = self.max_labels_after_bubbling.max(current);
                }
                if self.bubbling_has_peaked {
                    self.post_peak_bubble_steps += 1;
                    if self.post_peak_bubble_steps >= POST_PEAK_BUBBLE_LIMIT {
                        self.post_peak_bubble_steps = 0;
                        self.allowed_to_merge = true;
                    }
                }
            }
            Mode::Merge => {
                self.bubbling_has_peaked = false;
                self.max_labels_after_bubbling = 0;
                self.post_peak_bubble_steps = 0;

                if changed_or_stable {
                    self.allowed_to_merge = false;
                    self.post_intervention_count += 1;
                    if self.post_intervention_count > 0 {
                        self.intervention_event = true;
                    }
                }
            }
            Mode::Typical | Mode::Nurture => {}
        }

        self.prev_mode = Some(mode);
        self.prev_step_changed = changed_or_stable;
        self.t += 1;
    }

    /// Whether the partition snapshot from this step should be saved.
    #[must_use]
    pub(crate) fn do_save_partition(&self) -> bool {
        self.intervention_event
    }

    /// Whether the core loop should stop after this step.
    #[must_use]
    pub(crate) fn do_terminate(&self) -> bool {
        self.post_intervention_count >= self.n_partitions as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_twenty_steps_are_typical() {
        let tracker = Tracker::new(5, 3);
        assert_eq!(tracker.select_mode(), Mode::Typical);
    }

    #[test]
    fn merge_stable_increments_post_intervention_count() {
        let mut tracker = Tracker::new(5, 3);
        let before = tracker.post_intervention_count;
        let partition = Partition::new(vec![0, 1]);
        tracker.post_step_hook(Mode::Merge, true, &partition);
        assert_eq!(tracker.post_intervention_count, before + 1);
    }

    #[test]
    fn terminate_once_target_partitions_reached() {
        let mut tracker = Tracker::new(2, 1);
        let partition = Partition::new(vec![0, 1]);
        assert!(!tracker.do_terminate());
        tracker.post_step_hook(Mode::Merge, true, &partition);
        tracker.post_step_hook(Mode::Merge, true, &partition);
        assert!(tracker.do_terminate());
    }

    #[test]
    fn skip_typical_only_after_unchanged_typical_step() {
        let mut tracker = Tracker::new(5, 3);
        let partition = Partition::new(vec![0, 1]);
        assert!(!tracker.skip_typical());
        tracker.post_step_hook(Mode::Typical, false, &partition);
        assert!(tracker.skip_typical());
        tracker.post_step_hook(Mode::Typical, true, &partition);
        assert!(!tracker.skip_typical());
    }
}
