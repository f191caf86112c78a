use serde::{Deserialize, Serialize};
use tracing::warn;

/// One step's pending canvas position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionWrite {
  pub step_id: String,
  pub x: f64,
  pub y: f64,
}

#[derive(Debug, Clone)]
struct PendingPosition {
  write: PositionWrite,
  attempts: u32,
}

/// Save-queue for canvas positions. Moves are optimistic on the canvas; the
/// queue holds what has not yet reached the store, so failures are retried
/// and visible rather than silently dropped.
///
/// One batch is in flight at a time: [`take_batch`](Self::take_batch) moves
/// pending writes into the in-flight set, and the caller reports the
/// outcome with [`ack`](Self::ack) or [`nack`](Self::nack).
#[derive(Debug)]
pub struct PositionQueue {
  pending: Vec<PendingPosition>,
  in_flight: Vec<PendingPosition>,
  max_attempts: u32,
}

impl PositionQueue {
  pub fn new(max_attempts: u32) -> Self {
    Self {
      pending: Vec::new(),
      in_flight: Vec::new(),
      max_attempts,
    }
  }

  /// Record a step's latest position. An older pending write for the same
  /// step is replaced; only the final position is synced.
  pub fn enqueue(&mut self, step_id: &str, x: f64, y: f64) {
    self.pending.retain(|p| p.write.step_id != step_id);
    self.pending.push(PendingPosition {
      write: PositionWrite {
        step_id: step_id.to_string(),
        x,
        y,
      },
      attempts: 0,
    });
  }

  /// Take everything pending as one batch to sync. Empty while a previous
  /// batch is still in flight.
  pub fn take_batch(&mut self) -> Vec<PositionWrite> {
    if !self.in_flight.is_empty() {
      return Vec::new();
    }
    self.in_flight = std::mem::take(&mut self.pending);
    self.in_flight.iter().map(|p| p.write.clone()).collect()
  }

  /// The in-flight batch was persisted.
  pub fn ack(&mut self) {
    self.in_flight.clear();
  }

  /// The in-flight batch failed. Writes under the retry limit go back to
  /// pending (unless a newer write for the step arrived meanwhile); writes
  /// over it are dropped and returned so the owner can surface them.
  pub fn nack(&mut self) -> Vec<String> {
    let mut dropped = Vec::new();

    for mut entry in std::mem::take(&mut self.in_flight) {
      entry.attempts += 1;

      if self.pending.iter().any(|p| p.write.step_id == entry.write.step_id) {
        continue;
      }
      if entry.attempts >= self.max_attempts {
        warn!(step_id = %entry.write.step_id, attempts = entry.attempts, "position_write_dropped");
        dropped.push(entry.write.step_id);
        continue;
      }
      self.pending.push(entry);
    }

    dropped
  }

  /// Whether any position has not yet been confirmed persisted. Drives the
  /// "unsaved changes" indicator.
  pub fn has_unsaved_changes(&self) -> bool {
    !self.pending.is_empty() || !self.in_flight.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn latest_position_wins() {
    let mut queue = PositionQueue::new(3);
    queue.enqueue("s1", 10.0, 10.0);
    queue.enqueue("s1", 250.0, 180.0);

    let batch = queue.take_batch();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].x, 250.0);
    assert_eq!(batch[0].y, 180.0);
  }

  #[test]
  fn one_batch_in_flight_at_a_time() {
    let mut queue = PositionQueue::new(3);
    queue.enqueue("s1", 1.0, 1.0);

    let first = queue.take_batch();
    assert_eq!(first.len(), 1);

    queue.enqueue("s2", 2.0, 2.0);
    assert!(queue.take_batch().is_empty());

    queue.ack();
    let second = queue.take_batch();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].step_id, "s2");
  }

  #[test]
  fn failed_writes_are_retried_then_dropped() {
    let mut queue = PositionQueue::new(2);
    queue.enqueue("s1", 1.0, 1.0);

    assert!(queue.take_batch().len() == 1);
    assert!(queue.nack().is_empty());
    assert!(queue.has_unsaved_changes());

    assert_eq!(queue.take_batch().len(), 1);
    let dropped = queue.nack();
    assert_eq!(dropped, vec!["s1".to_string()]);
    assert!(!queue.has_unsaved_changes());
  }

  #[test]
  fn newer_write_supersedes_failed_one() {
    let mut queue = PositionQueue::new(3);
    queue.enqueue("s1", 1.0, 1.0);
    let _ = queue.take_batch();

    queue.enqueue("s1", 9.0, 9.0);
    let dropped = queue.nack();
    assert!(dropped.is_empty());

    let batch = queue.take_batch();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].x, 9.0);
  }

  #[test]
  fn unsaved_indicator_clears_on_ack() {
    let mut queue = PositionQueue::new(3);
    assert!(!queue.has_unsaved_changes());

    queue.enqueue("s1", 1.0, 1.0);
    assert!(queue.has_unsaved_changes());

    let _ = queue.take_batch();
    assert!(queue.has_unsaved_changes());

    queue.ack();
    assert!(!queue.has_unsaved_changes());
  }
}
