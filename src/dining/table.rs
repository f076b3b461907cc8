//! Deadlock-free dining philosophers table.

use std::sync::{Condvar, Mutex};
use std::time::Instant;

use serde::Serialize;

use super::error::{TableError, TableResult};
use super::TableStats;

/// Per-philosopher state in the dining protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PhilosopherState {
    /// Not interested in eating.
    Thinking,
    /// Waiting for both neighbors to stop eating.
    Hungry,
    /// Holding both conceptual forks.
    Eating,
}

struct Seat {
    state: PhilosopherState,
    meals: u64,
    avg_wait_secs: f64,
}

struct TableState {
    seats: Vec<Seat>,
    stopped: bool,
}

impl TableState {
    /// The grant predicate: hungry, and neither neighbor currently eating.
    fn can_eat(&self, seat: usize) -> bool {
        let n = self.seats.len();
        let left = (seat + n - 1) % n;
        let right = (seat + 1) % n;
        self.seats[seat].state == PhilosopherState::Hungry
            && self.seats[left].state != PhilosopherState::Eating
            && self.seats[right].state != PhilosopherState::Eating
    }

    /// Safety invariant: no two adjacent seats eat simultaneously.
    fn no_adjacent_eating(&self) -> bool {
        let n = self.seats.len();
        if n < 2 {
            return true;
        }
        (0..n).all(|i| {
            self.seats[i].state != PhilosopherState::Eating
                || self.seats[(i + 1) % n].state != PhilosopherState::Eating
        })
    }
}

/// N philosophers around a table, one global mutex and one condition variable
/// per seat.
///
/// A philosopher eats only when hungry and neither neighbor is eating,
/// verified against the full state vector under the single lock. No seat ever
/// holds a partial resource, so there is no circular wait and no deadlock.
/// Fairness is the weak guarantee of the source protocol: releasing a seat
/// signals each neighbor whose own predicate now holds, nothing more.
pub struct DiningTable {
    state: Mutex<TableState>,
    can_eat: Box<[Condvar]>,
    seat_count: usize,
    started: Instant,
}

impl DiningTable {
    /// Create a table with `seats` philosophers, all `Thinking`.
    ///
    /// # Panics
    /// Panics if `seats` is zero.
    pub fn new(seats: usize) -> Self {
        assert!(seats > 0, "table must have at least one seat");
        let seat_states = (0..seats)
            .map(|_| Seat {
                state: PhilosopherState::Thinking,
                meals: 0,
                avg_wait_secs: 0.0,
            })
            .collect();
        let can_eat = (0..seats).map(|_| Condvar::new()).collect::<Vec<_>>();
        Self {
            state: Mutex::new(TableState {
                seats: seat_states,
                stopped: false,
            }),
            can_eat: can_eat.into_boxed_slice(),
            seat_count: seats,
            started: Instant::now(),
        }
    }

    fn check_seat(&self, seat: usize) -> TableResult<()> {
        if seat >= self.seat_count {
            return Err(TableError::InvalidSeat {
                seat,
                seats: self.seat_count,
            });
        }
        Ok(())
    }

    /// Become hungry and block until both conceptual forks are available.
    ///
    /// Returns `Stopped` if the table is stopped before or during the wait;
    /// the seat is reset to `Thinking` in that case.
    pub fn pickup(&self, seat: usize) -> TableResult<()> {
        self.check_seat(seat)?;
        let begin = Instant::now();
        let mut state = self.state.lock().unwrap();
        if state.stopped {
            return Err(TableError::Stopped);
        }

        state.seats[seat].state = PhilosopherState::Hungry;
        tracing::debug!(seat, "philosopher hungry");

        loop {
            if state.stopped {
                state.seats[seat].state = PhilosopherState::Thinking;
                return Err(TableError::Stopped);
            }
            if state.can_eat(seat) {
                break;
            }
            state = self.can_eat[seat].wait(state).unwrap();
        }

        state.seats[seat].state = PhilosopherState::Eating;
        debug_assert!(state.no_adjacent_eating(), "adjacent seats eating");

        let waited = begin.elapsed().as_secs_f64();
        let entry = &mut state.seats[seat];
        entry.avg_wait_secs =
            (entry.avg_wait_secs * entry.meals as f64 + waited) / (entry.meals + 1) as f64;
        entry.meals += 1;
        tracing::debug!(seat, meals = entry.meals, "philosopher eating");
        Ok(())
    }

    /// Stop eating and signal each neighbor that can now eat.
    ///
    /// Still permitted after `stop`, so exiting philosophers can release
    /// their seats.
    pub fn putdown(&self, seat: usize) -> TableResult<()> {
        self.check_seat(seat)?;
        let mut state = self.state.lock().unwrap();
        state.seats[seat].state = PhilosopherState::Thinking;
        tracing::debug!(seat, "philosopher thinking");

        let n = self.seat_count;
        let left = (seat + n - 1) % n;
        let right = (seat + 1) % n;
        if state.can_eat(left) {
            self.can_eat[left].notify_one();
        }
        if right != left && state.can_eat(right) {
            self.can_eat[right].notify_one();
        }
        Ok(())
    }

    /// Stop the table, waking every blocked `pickup` with `Stopped`.
    ///
    /// Idempotent.
    pub fn stop(&self) {
        let mut state = self.state.lock().unwrap();
        if state.stopped {
            return;
        }
        state.stopped = true;
        tracing::info!(seats = self.seat_count, "dining table stopped");
        drop(state);
        for cv in self.can_eat.iter() {
            cv.notify_all();
        }
    }

    /// Number of seats, fixed at construction.
    pub fn seats(&self) -> usize {
        self.seat_count
    }

    /// True once `stop` has been called.
    pub fn is_stopped(&self) -> bool {
        self.state.lock().unwrap().stopped
    }

    /// Meals eaten at `seat`, or `None` for an out-of-range index.
    pub fn meals_eaten(&self, seat: usize) -> Option<u64> {
        let state = self.state.lock().unwrap();
        state.seats.get(seat).map(|s| s.meals)
    }

    /// Copy of the full philosopher state vector, taken under the lock.
    pub fn state_snapshot(&self) -> Vec<PhilosopherState> {
        let state = self.state.lock().unwrap();
        state.seats.iter().map(|s| s.state).collect()
    }

    /// Per-seat meal counters, wait averages and derived rates.
    pub fn stats(&self) -> TableStats {
        let state = self.state.lock().unwrap();
        let elapsed = self.started.elapsed().as_secs_f64();
        let meals: Vec<u64> = state.seats.iter().map(|s| s.meals).collect();
        let meals_per_min = meals
            .iter()
            .map(|&m| if elapsed > 0.0 { m as f64 / elapsed * 60.0 } else { 0.0 })
            .collect();
        TableStats {
            seats: self.seat_count,
            meals,
            avg_wait_secs: state.seats.iter().map(|s| s.avg_wait_secs).collect(),
            meals_per_min,
            elapsed_secs: elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_invalid_seat() {
        let table = DiningTable::new(5);
        let err = table.pickup(5).unwrap_err();
        assert!(matches!(err, TableError::InvalidSeat { seat: 5, seats: 5 }));
        assert!(table.putdown(9).is_err());
    }

    #[test]
    fn test_single_philosopher_cycle() {
        let table = DiningTable::new(5);
        table.pickup(2).unwrap();
        assert_eq!(table.state_snapshot()[2], PhilosopherState::Eating);
        table.putdown(2).unwrap();
        assert_eq!(table.state_snapshot()[2], PhilosopherState::Thinking);
        assert_eq!(table.meals_eaten(2), Some(1));
    }

    #[test]
    fn test_non_adjacent_seats_eat_together() {
        let table = DiningTable::new(5);
        table.pickup(0).unwrap();
        table.pickup(2).unwrap();
        let snapshot = table.state_snapshot();
        assert_eq!(snapshot[0], PhilosopherState::Eating);
        assert_eq!(snapshot[2], PhilosopherState::Eating);
        table.putdown(0).unwrap();
        table.putdown(2).unwrap();
    }

    #[test]
    fn test_adjacent_seat_blocks_until_putdown() {
        let table = Arc::new(DiningTable::new(5));
        table.pickup(0).unwrap();

        let neighbor = {
            let table = Arc::clone(&table);
            thread::spawn(move || table.pickup(1))
        };
        thread::sleep(Duration::from_millis(50));
        assert_eq!(table.state_snapshot()[1], PhilosopherState::Hungry);

        table.putdown(0).unwrap();
        neighbor.join().unwrap().unwrap();
        assert_eq!(table.state_snapshot()[1], PhilosopherState::Eating);
        table.putdown(1).unwrap();
    }

    #[test]
    fn test_stop_rejects_new_pickup() {
        let table = DiningTable::new(3);
        table.stop();
        assert!(table.is_stopped());
        assert!(table.pickup(0).unwrap_err().is_stopped());
    }

    #[test]
    fn test_stop_wakes_blocked_pickup() {
        let table = Arc::new(DiningTable::new(5));
        table.pickup(0).unwrap();

        let neighbor = {
            let table = Arc::clone(&table);
            thread::spawn(move || table.pickup(1))
        };
        thread::sleep(Duration::from_millis(50));
        table.stop();

        let err = neighbor.join().unwrap().unwrap_err();
        assert!(err.is_stopped());
        // The blocked seat was reset, not left hungry.
        assert_eq!(table.state_snapshot()[1], PhilosopherState::Thinking);
        table.putdown(0).unwrap();
    }

    #[test]
    fn test_stats_track_meals() {
        let table = DiningTable::new(3);
        for _ in 0..4 {
            table.pickup(1).unwrap();
            table.putdown(1).unwrap();
        }
        let stats = table.stats();
        assert_eq!(stats.meals, vec![0, 4, 0]);
        assert_eq!(stats.seats, 3);
        assert!(stats.avg_wait_secs[1] >= 0.0);
    }
}
