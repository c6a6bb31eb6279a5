//! Resource-constrained project scheduling.
//!
//! A solution is an activity list: a permutation of activities in which
//! every activity comes after all of its predecessors. The serial schedule
//! generation scheme turns the list into start times by placing each
//! activity at the earliest time that respects both its predecessors and
//! the renewable resource capacities. Resource usage is tracked as a
//! piecewise-constant profile with one breakpoint per activity start and
//! finish, so decoding cost depends on the number of activities only.

use rand::Rng;

use super::permutation::check_permutation;
use super::InstanceError;
use crate::sa::SaProblem;

/// One project activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub duration: u64,
    /// Units of each renewable resource held while running.
    pub demands: Vec<u32>,
    /// Activities that may only start after this one finishes.
    pub successors: Vec<usize>,
}

impl Activity {
    pub fn new(duration: u64, demands: Vec<u32>, successors: Vec<usize>) -> Self {
        Self {
            duration,
            demands,
            successors,
        }
    }
}

/// Resource-constrained project scheduling, minimizing makespan.
#[derive(Debug, Clone)]
pub struct ProjectSchedule {
    activities: Vec<Activity>,
    predecessors: Vec<Vec<usize>>,
    capacities: Vec<u32>,
}

impl ProjectSchedule {
    /// Validates the instance: demand vectors match the resources, no
    /// demand exceeds its capacity, successors exist and the precedence
    /// graph is acyclic. The sum of all durations must fit in a `u64`,
    /// which bounds every start and finish time.
    pub fn new(activities: Vec<Activity>, capacities: Vec<u32>) -> Result<Self, InstanceError> {
        let n = activities.len();
        if n == 0 {
            return Err(InstanceError::Empty("activities"));
        }
        let mut predecessors = vec![Vec::new(); n];
        for (activity, a) in activities.iter().enumerate() {
            if a.demands.len() != capacities.len() {
                return Err(InstanceError::LengthMismatch {
                    what: "activity demands",
                    expected: capacities.len(),
                    found: a.demands.len(),
                });
            }
            for (resource, (&demand, &capacity)) in a.demands.iter().zip(&capacities).enumerate() {
                if demand > capacity {
                    return Err(InstanceError::DemandExceedsCapacity {
                        activity,
                        resource,
                        demand,
                        capacity,
                    });
                }
            }
            for &successor in &a.successors {
                if successor >= n {
                    return Err(InstanceError::UnknownSuccessor {
                        activity,
                        successor,
                    });
                }
                predecessors[successor].push(activity);
            }
        }
        if !is_acyclic(&activities, &predecessors) {
            return Err(InstanceError::PrecedenceCycle);
        }
        activities
            .iter()
            .try_fold(0u64, |total, a| total.checked_add(a.duration))
            .ok_or(InstanceError::DurationOverflow)?;
        Ok(Self {
            activities,
            predecessors,
            capacities,
        })
    }

    /// A five-activity chain over five resources.
    pub fn demo() -> Self {
        let activities = vec![
            Activity::new(3, vec![1, 0, 0, 0, 0], vec![1]),
            Activity::new(5, vec![0, 2, 1, 0, 0], vec![2]),
            Activity::new(2, vec![0, 0, 1, 0, 0], vec![3]),
            Activity::new(4, vec![1, 1, 0, 0, 0], vec![4]),
            Activity::new(1, vec![0, 0, 0, 1, 1], vec![]),
        ];
        Self {
            predecessors: vec![vec![], vec![0], vec![1], vec![2], vec![3]],
            capacities: vec![2, 3, 2, 1, 1],
            activities,
        }
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn capacities(&self) -> &[u32] {
        &self.capacities
    }

    pub fn predecessors(&self, activity: usize) -> &[usize] {
        &self.predecessors[activity]
    }

    /// Serial schedule generation. Returns the start time of each activity,
    /// indexed by activity.
    pub fn schedule(&self, list: &[usize]) -> Vec<u64> {
        let mut profile = Profile::new(self.capacities.len());
        let mut starts = vec![0u64; self.activities.len()];
        let mut finish = vec![0u64; self.activities.len()];

        for &a in list {
            let activity = &self.activities[a];
            let mut start = self.predecessors[a]
                .iter()
                .map(|&p| finish[p])
                .max()
                .unwrap_or(0);
            while let Err(next) = profile.fits(start, activity, &self.capacities) {
                start = next;
            }
            profile.reserve(start, activity);
            starts[a] = start;
            finish[a] = start + activity.duration;
        }
        starts
    }

    /// Bounds of the positions `list[i]` may move to without breaking
    /// precedence.
    fn shift_window(&self, list: &[usize], i: usize) -> (usize, usize) {
        let a = list[i];
        let lo = (0..i)
            .rev()
            .find(|&p| self.predecessors[a].contains(&list[p]))
            .map_or(0, |p| p + 1);
        let hi = (i + 1..list.len())
            .find(|&p| self.activities[a].successors.contains(&list[p]))
            .map_or(list.len() - 1, |p| p - 1);
        (lo, hi)
    }
}

/// Resource usage over time. `usage[i]` holds on `[times[i], times[i + 1])`
/// and the last entry extends forever.
struct Profile {
    times: Vec<u64>,
    usage: Vec<Vec<u32>>,
}

impl Profile {
    fn new(resources: usize) -> Self {
        Self {
            times: vec![0],
            usage: vec![vec![0; resources]],
        }
    }

    /// Index of the segment containing `t`.
    fn segment(&self, t: u64) -> usize {
        self.times.partition_point(|&x| x <= t) - 1
    }

    /// `Ok` when `activity` can run from `t`; otherwise the next breakpoint
    /// worth trying.
    fn fits(&self, t: u64, activity: &Activity, capacities: &[u32]) -> Result<(), u64> {
        if activity.duration == 0 {
            return Ok(());
        }
        let end = t + activity.duration;
        let mut i = self.segment(t);
        while i < self.times.len() && self.times[i] < end {
            let over = self.usage[i]
                .iter()
                .zip(&activity.demands)
                .zip(capacities)
                .any(|((&used, &demand), &cap)| used + demand > cap);
            if over {
                // The last segment is always empty, so a conflict has a successor.
                return Err(self.times[i + 1]);
            }
            i += 1;
        }
        Ok(())
    }

    /// Makes `t` a breakpoint and returns its segment index.
    fn split(&mut self, t: u64) -> usize {
        let i = self.segment(t);
        if self.times[i] == t {
            return i;
        }
        let usage = self.usage[i].clone();
        self.times.insert(i + 1, t);
        self.usage.insert(i + 1, usage);
        i + 1
    }

    fn reserve(&mut self, t: u64, activity: &Activity) {
        if activity.duration == 0 {
            return;
        }
        let first = self.split(t);
        let last = self.split(t + activity.duration);
        for row in &mut self.usage[first..last] {
            for (used, &demand) in row.iter_mut().zip(&activity.demands) {
                *used += demand;
            }
        }
    }
}

/// Kahn's algorithm.
fn is_acyclic(activities: &[Activity], predecessors: &[Vec<usize>]) -> bool {
    let mut indegree: Vec<usize> = predecessors.iter().map(Vec::len).collect();
    let mut ready: Vec<usize> = (0..activities.len()).filter(|&a| indegree[a] == 0).collect();
    let mut visited = 0;
    while let Some(a) = ready.pop() {
        visited += 1;
        for &s in &activities[a].successors {
            indegree[s] -= 1;
            if indegree[s] == 0 {
                ready.push(s);
            }
        }
    }
    visited == activities.len()
}

impl SaProblem for ProjectSchedule {
    type Solution = Vec<usize>;
    type Cost = u64;

    /// A random topological order.
    fn initial_solution<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        let mut indegree: Vec<usize> = self.predecessors.iter().map(Vec::len).collect();
        let mut eligible: Vec<usize> = (0..self.activities.len())
            .filter(|&a| indegree[a] == 0)
            .collect();
        let mut list = Vec::with_capacity(self.activities.len());
        while !eligible.is_empty() {
            let a = eligible.swap_remove(rng.random_range(0..eligible.len()));
            list.push(a);
            for &s in &self.activities[a].successors {
                indegree[s] -= 1;
                if indegree[s] == 0 {
                    eligible.push(s);
                }
            }
        }
        list
    }

    fn cost(&self, list: &Vec<usize>) -> u64 {
        self.schedule(list)
            .iter()
            .zip(&self.activities)
            .map(|(&start, a)| start + a.duration)
            .max()
            .unwrap_or(0)
    }

    /// Moves one activity to another position between its last
    /// predecessor and first successor. When no activity can move, as in a
    /// pure chain, the list is returned unchanged.
    fn neighbor<R: Rng>(&self, list: &Vec<usize>, rng: &mut R) -> Vec<usize> {
        let mut new = list.clone();
        for _ in 0..new.len() {
            let i = rng.random_range(0..new.len());
            let (lo, hi) = self.shift_window(&new, i);
            if hi <= lo {
                continue;
            }
            let mut target = rng.random_range(lo..hi);
            if target >= i {
                target += 1;
            }
            let a = new.remove(i);
            new.insert(target, a);
            break;
        }
        new
    }

    fn check(&self, list: &Vec<usize>) -> Result<(), String> {
        check_permutation(list, self.activities.len())?;
        let mut position = vec![0usize; list.len()];
        for (p, &a) in list.iter().enumerate() {
            position[a] = p;
        }
        for (a, activity) in self.activities.iter().enumerate() {
            if let Some(&s) = activity.successors.iter().find(|&&s| position[s] < position[a]) {
                return Err(format!("activity {s} is listed before its predecessor {a}"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sa::{SaConfig, SaRunner};
    use crate::scheduling::permutation::all_permutations;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Two short chains sharing one resource of capacity 2.
    fn forked() -> ProjectSchedule {
        ProjectSchedule::new(
            vec![
                Activity::new(3, vec![1], vec![2]),
                Activity::new(2, vec![1], vec![3]),
                Activity::new(2, vec![2], vec![]),
                Activity::new(1, vec![1], vec![]),
            ],
            vec![2],
        )
        .unwrap()
    }

    /// Six activities where list order matters for the makespan.
    fn contended() -> ProjectSchedule {
        ProjectSchedule::new(
            vec![
                Activity::new(2, vec![1, 0], vec![3]),
                Activity::new(3, vec![1, 1], vec![4]),
                Activity::new(1, vec![0, 1], vec![4, 5]),
                Activity::new(4, vec![2, 0], vec![]),
                Activity::new(2, vec![1, 1], vec![]),
                Activity::new(3, vec![0, 1], vec![]),
            ],
            vec![2, 1],
        )
        .unwrap()
    }

    fn brute_force(problem: &ProjectSchedule) -> u64 {
        all_permutations(problem.activities().len())
            .into_iter()
            .filter(|p| problem.check(p).is_ok())
            .map(|p| problem.cost(&p))
            .min()
            .unwrap()
    }

    #[test]
    fn test_demo_chain() {
        let problem = ProjectSchedule::demo();
        let list = vec![0, 1, 2, 3, 4];
        assert_eq!(problem.schedule(&list), vec![0, 3, 8, 10, 14]);
        assert_eq!(problem.cost(&list), 15);

        let config = SaConfig::default().with_check_solutions(true).with_seed(1);
        let result = SaRunner::run(&problem, &config).unwrap();
        assert_eq!(result.best, list);
        assert_eq!(result.best_cost, 15);
    }

    #[test]
    fn test_demo_matches_validated_construction() {
        let demo = ProjectSchedule::demo();
        let built =
            ProjectSchedule::new(demo.activities().to_vec(), demo.capacities().to_vec()).unwrap();
        for a in 0..5 {
            assert_eq!(demo.predecessors(a), built.predecessors(a));
        }
    }

    #[test]
    fn test_serial_generation_shares_resource() {
        let problem = forked();
        assert_eq!(problem.schedule(&[0, 1, 2, 3]), vec![0, 0, 3, 2]);
        assert_eq!(problem.schedule(&[1, 3, 0, 2]), vec![0, 0, 3, 2]);
        assert_eq!(problem.cost(&vec![0, 1, 2, 3]), 5);
    }

    #[test]
    fn test_capacity_delays_start() {
        let problem = ProjectSchedule::new(
            vec![Activity::new(2, vec![1], vec![]), Activity::new(2, vec![1], vec![])],
            vec![1],
        )
        .unwrap();
        assert_eq!(problem.schedule(&[1, 0]), vec![2, 0]);
        assert_eq!(problem.cost(&vec![1, 0]), 4);
    }

    #[test]
    fn test_long_durations_schedule_without_time_grid() {
        let long = 1u64 << 40;
        let problem = ProjectSchedule::new(
            vec![
                Activity::new(long, vec![1], vec![]),
                Activity::new(long, vec![1], vec![]),
                Activity::new(3, vec![0], vec![1]),
            ],
            vec![1],
        )
        .unwrap();
        assert_eq!(problem.schedule(&[0, 2, 1]), vec![0, long, 0]);
        assert_eq!(problem.schedule(&[2, 1, 0]), vec![long + 3, 3, 0]);
        assert_eq!(problem.cost(&vec![0, 2, 1]), 2 * long);
    }

    #[test]
    fn test_total_duration_overflow_rejected() {
        let half = u64::MAX / 2 + 1;
        let err = ProjectSchedule::new(
            vec![
                Activity::new(half, vec![1], vec![]),
                Activity::new(half, vec![1], vec![]),
            ],
            vec![1],
        )
        .unwrap_err();
        assert_eq!(err, InstanceError::DurationOverflow);
    }

    #[test]
    fn test_zero_duration_activity_takes_no_capacity() {
        let problem = ProjectSchedule::new(
            vec![
                Activity::new(4, vec![1], vec![1]),
                Activity::new(0, vec![1], vec![2]),
                Activity::new(2, vec![1], vec![]),
                Activity::new(1, vec![1], vec![]),
            ],
            vec![1],
        )
        .unwrap();
        assert_eq!(problem.schedule(&[0, 3, 1, 2]), vec![0, 4, 5, 4]);
    }

    #[test]
    fn test_reaches_brute_force_optimum() {
        let problem = contended();
        let optimum = brute_force(&problem);
        let config = SaConfig::default()
            .with_iterations_per_temperature(20)
            .with_check_solutions(true)
            .with_seed(8);

        let result = SaRunner::run(&problem, &config).unwrap();

        assert_eq!(result.best_cost, optimum);
    }

    #[test]
    fn test_check_rejects_precedence_violation() {
        let problem = forked();
        assert!(problem.check(&vec![0, 1, 2, 3]).is_ok());
        let err = problem.check(&vec![2, 0, 1, 3]).unwrap_err();
        assert!(err.contains("predecessor 0"));
        assert!(problem.check(&vec![0, 1, 2]).is_err());
    }

    #[test]
    fn test_instance_errors() {
        assert_eq!(
            ProjectSchedule::new(vec![], vec![1]).unwrap_err(),
            InstanceError::Empty("activities")
        );
        assert_eq!(
            ProjectSchedule::new(vec![Activity::new(1, vec![3], vec![])], vec![2]).unwrap_err(),
            InstanceError::DemandExceedsCapacity {
                activity: 0,
                resource: 0,
                demand: 3,
                capacity: 2
            }
        );
        assert_eq!(
            ProjectSchedule::new(vec![Activity::new(1, vec![1], vec![4])], vec![2]).unwrap_err(),
            InstanceError::UnknownSuccessor {
                activity: 0,
                successor: 4
            }
        );
        assert_eq!(
            ProjectSchedule::new(
                vec![
                    Activity::new(1, vec![], vec![1]),
                    Activity::new(1, vec![], vec![0]),
                ],
                vec![],
            )
            .unwrap_err(),
            InstanceError::PrecedenceCycle
        );
        assert!(matches!(
            ProjectSchedule::new(vec![Activity::new(1, vec![1, 1], vec![])], vec![2]),
            Err(InstanceError::LengthMismatch { what: "activity demands", .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_moves_keep_precedence(seed in any::<u64>(), steps in 1usize..30) {
            let problem = contended();
            let mut rng = StdRng::seed_from_u64(seed);
            let mut list = problem.initial_solution(&mut rng);
            prop_assert!(problem.check(&list).is_ok());
            for _ in 0..steps {
                list = problem.neighbor(&list, &mut rng);
                prop_assert!(problem.check(&list).is_ok(), "{:?}", list);
            }
        }
    }
}
