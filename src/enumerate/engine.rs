//! The double-description driver.
//!
//! The working set starts as the generators of the non-negative orthant and
//! is cut by one hyperplane at a time. For each hyperplane `h` the current
//! rays are split by the sign of `r·h`; rays on `h` carry over, and every
//! adjacent pair `(p, q)` with `p·h > 0 > q·h` contributes the ray
//! `(h·p)·q − (h·q)·p`, which lies on `h`. After the last hyperplane the
//! working set is exactly the set of extremal rays of the final cone.
//!
//! Adjacency is decided combinatorially: `p` and `q` are adjacent unless
//! some third ray vanishes on every coordinate where both `p` and `q`
//! vanish.

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::enumerate::cancel::CancelHandle;
use crate::enumerate::config::EnumerationConfig;
use crate::enumerate::registry::RayRegistry;
use crate::enumerate::sink::RaySink;
use crate::polyhedral::{BigInt, ConstraintSet, RayVec, Sign, ZeroMask};
use crate::utils::errors::{RayEnumError, Result};
use crate::utils::matrix::{EqMatrix, RowView};

/// Lifecycle of an [`Enumerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumeratorState {
    /// Constructed and waiting for [`Enumerator::run`]
    Ready,
    /// Inside [`Enumerator::run`]
    Running,
    /// A run has finished, successfully or not
    Done,
}

/// Counters collected during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumerationStats {
    /// Hyperplanes intersected before the run finished
    pub hyperplanes_processed: usize,
    /// Generators dropped up front as inadmissible
    pub generators_discarded: usize,
    /// Positive/negative pairs examined
    pub pairs_considered: u64,
    /// Pairs rejected by the constraint set
    pub pairs_inadmissible: u64,
    /// Pairs rejected by the adjacency test
    pub pairs_non_adjacent: u64,
    /// Pairs skipped because a dot product was infinite
    pub pairs_unbounded: u64,
    /// New rays created on a hyperplane
    pub intersections: u64,
    /// Rays rejected because an equal ray was already present
    pub duplicates_suppressed: u64,
    /// Largest working set seen
    pub peak_working_set: usize,
    /// Rays handed to the sink
    pub rays_emitted: usize,
}

/// A ray of the current generation together with its zero coordinates.
struct WorkingRay {
    ray: RayVec,
    zeros: ZeroMask,
}

impl WorkingRay {
    fn new(ray: RayVec) -> Self {
        let zeros = ray.zero_mask();
        Self { ray, zeros }
    }
}

/// Positions of the working rays on, above and below a hyperplane.
#[derive(Debug, Default)]
struct Partition {
    zero: Vec<usize>,
    positive: Vec<usize>,
    negative: Vec<usize>,
}

impl Partition {
    fn classify(dots: &[BigInt]) -> Self {
        let mut partition = Partition::default();
        for (i, d) in dots.iter().enumerate() {
            match d.sign() {
                Sign::Zero => partition.zero.push(i),
                Sign::Positive => partition.positive.push(i),
                Sign::Negative => partition.negative.push(i),
            }
        }
        partition
    }
}

/// The point where the segment from `p` to `q` crosses the hyperplane.
///
/// `dot_p` and `dot_q` are `h·p` and `h·q`; they must be finite and of
/// opposite strict signs. The result `(h·p)·q − (h·q)·p` is a positive
/// combination of `p` and `q`, returned in primitive form.
pub fn line_intersection(p: &RayVec, dot_p: &BigInt, q: &RayVec, dot_q: &BigInt) -> Result<RayVec> {
    if dot_p.is_infinite() || dot_q.is_infinite() {
        return Err(RayEnumError::invalid_operation(
            "intersection across an infinite dot product",
        ));
    }
    let mut ray = q.clone();
    ray.scale_assign(dot_p);
    ray.sub_scaled(p, dot_q)?;
    ray.normalise();
    Ok(ray)
}

/// Is the pair `(p, q)` adjacent among `rays`?
fn is_adjacent(rays: &[WorkingRay], p: usize, q: usize) -> bool {
    let (zp, zq) = (&rays[p].zeros, &rays[q].zeros);
    !rays
        .iter()
        .enumerate()
        .any(|(r, w)| r != p && r != q && w.zeros.contains_intersection(zp, zq))
}

/// Enumerates the extremal rays of `{x ≥ 0 : M·x = 0}`.
///
/// ```
/// use rayenum::prelude::*;
///
/// let matrix = EqMatrix::from_rows(3, &[vec![1, -1, 0]])?;
/// let constraints = ConstraintSet::empty();
/// let mut rays: Vec<RayVec> = Vec::new();
/// Enumerator::for_orthant(&matrix, &constraints).run(&mut rays)?;
/// assert_eq!(rays, vec![RayVec::from_i64s(&[0, 0, 1]), RayVec::from_i64s(&[1, 1, 0])]);
/// # Ok::<(), rayenum::RayEnumError>(())
/// ```
pub struct Enumerator<'a> {
    matrix: &'a EqMatrix,
    constraints: &'a ConstraintSet,
    initial: Vec<RayVec>,
    config: EnumerationConfig,
    cancel: CancelHandle,
    state: EnumeratorState,
    stats: EnumerationStats,
}

impl<'a> Enumerator<'a> {
    /// Create an enumerator over explicit generators of the starting cone.
    pub fn new(matrix: &'a EqMatrix, constraints: &'a ConstraintSet, initial: Vec<RayVec>) -> Self {
        Self {
            matrix,
            constraints,
            initial,
            config: EnumerationConfig::default(),
            cancel: CancelHandle::new(),
            state: EnumeratorState::Ready,
            stats: EnumerationStats::default(),
        }
    }

    /// Create an enumerator starting from the axes of the orthant.
    pub fn for_orthant(matrix: &'a EqMatrix, constraints: &'a ConstraintSet) -> Self {
        Self::new(matrix, constraints, Self::orthant_axes(matrix.cols()))
    }

    /// The `n` unit vectors generating the non-negative orthant.
    pub fn orthant_axes(n: usize) -> Vec<RayVec> {
        (0..n).filter_map(|axis| RayVec::unit(n, axis).ok()).collect()
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: EnumerationConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the admissibility flag.
    pub fn admissible_only(mut self, flag: bool) -> Self {
        self.config.admissible_only = flag;
        self
    }

    /// Use an existing cancellation handle.
    pub fn with_cancel_handle(mut self, handle: CancelHandle) -> Self {
        self.cancel = handle;
        self
    }

    /// A handle that cancels this enumerator's run.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// The active configuration.
    pub fn config(&self) -> &EnumerationConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EnumeratorState {
        self.state
    }

    /// Counters from the last (or current) run.
    pub fn stats(&self) -> &EnumerationStats {
        &self.stats
    }

    /// Run the enumeration, handing every extremal ray to `sink`.
    ///
    /// An enumerator runs at most once; afterwards it is
    /// [`EnumeratorState::Done`] whatever the outcome.
    pub fn run<S: RaySink + ?Sized>(&mut self, sink: &mut S) -> Result<EnumerationStats> {
        if self.state != EnumeratorState::Ready {
            return Err(RayEnumError::invalid_operation(
                "enumerator has already run; construct a fresh one",
            ));
        }
        self.state = EnumeratorState::Running;
        let outcome = self.run_inner(sink);
        self.state = EnumeratorState::Done;
        outcome
    }

    /// Run the enumeration and collect the rays.
    pub fn run_to_vec(mut self) -> Result<Vec<RayVec>> {
        let mut rays: Vec<RayVec> = Vec::new();
        self.run(&mut rays)?;
        Ok(rays)
    }

    fn run_inner<S: RaySink + ?Sized>(&mut self, sink: &mut S) -> Result<EnumerationStats> {
        let matrix = self.matrix;
        let mut working = self.prepare_generators()?;
        let order = self.config.order.arrange(matrix);
        info!(
            "Enumerating extremal rays: {} hyperplanes over {} coordinates, {} generators, {} constraint groups{}",
            matrix.rows(),
            matrix.cols(),
            working.len(),
            self.constraints.len(),
            if self.config.admissible_only { " (admissible only)" } else { "" }
        );

        let mut registry = RayRegistry::new();
        self.stats.peak_working_set = working.len();
        for (step, &row_index) in order.iter().enumerate() {
            self.check_cancelled()?;
            if working.is_empty() {
                debug!(
                    "Working set empty; skipping the remaining {} hyperplanes",
                    order.len() - step
                );
                break;
            }
            let row = matrix.row(row_index)?;
            working = self.intersect_hyperplane(working, row, &mut registry)?;
            self.stats.hyperplanes_processed += 1;
            self.stats.peak_working_set = self.stats.peak_working_set.max(working.len());
        }

        self.check_cancelled()?;
        for w in working {
            if self.config.admissible_only && !self.constraints.admits_zero_mask(&w.zeros) {
                trace!("Dropping inadmissible ray {}", w.ray);
                continue;
            }
            sink.accept(w.ray);
            self.stats.rays_emitted += 1;
        }
        info!(
            "Enumeration finished: {} rays emitted, peak working set {}, {} intersections",
            self.stats.rays_emitted, self.stats.peak_working_set, self.stats.intersections
        );
        Ok(self.stats.clone())
    }

    /// Validate the generators and reduce them to distinct primitive rays.
    fn prepare_generators(&mut self) -> Result<Vec<WorkingRay>> {
        let n = self.matrix.cols();
        self.constraints.validate(n)?;

        let mut registry = RayRegistry::new();
        for (i, ray) in std::mem::take(&mut self.initial).into_iter().enumerate() {
            if ray.len() != n {
                return Err(RayEnumError::invalid_input(format!(
                    "generator {} has length {} but the matrix has {} columns",
                    i,
                    ray.len(),
                    n
                )));
            }
            if ray.is_zero() {
                return Err(RayEnumError::invalid_input(format!("generator {} is zero", i)));
            }
            if !ray.is_non_negative() {
                return Err(RayEnumError::invalid_input(format!(
                    "generator {} has a negative coordinate: {}",
                    i, ray
                )));
            }
            if self.config.admissible_only && !self.constraints.admits_ray(&ray) {
                trace!("Discarding inadmissible generator {}", ray);
                self.stats.generators_discarded += 1;
                continue;
            }
            if !registry.insert_if_new(ray) {
                self.stats.duplicates_suppressed += 1;
            }
        }
        Ok(registry.take_rays().into_iter().map(WorkingRay::new).collect())
    }

    /// Cut the working set by one hyperplane.
    fn intersect_hyperplane(
        &mut self,
        current: Vec<WorkingRay>,
        row: RowView<'_>,
        registry: &mut RayRegistry,
    ) -> Result<Vec<WorkingRay>> {
        let dots = current
            .iter()
            .map(|w| w.ray.dot(&row))
            .collect::<Result<Vec<BigInt>>>()?;
        let partition = Partition::classify(&dots);
        debug!(
            "Hyperplane {}: {} rays on, {} above, {} below",
            row.index(),
            partition.zero.len(),
            partition.positive.len(),
            partition.negative.len()
        );

        registry.clear();
        for &z in &partition.zero {
            registry.insert_if_new(current[z].ray.clone());
        }

        let admissible_only = self.config.admissible_only;
        let poll = self.config.cancel_poll_interval.max(1) as u64;
        let before = self.stats.clone();
        for &p in &partition.positive {
            for &q in &partition.negative {
                self.stats.pairs_considered += 1;
                if self.stats.pairs_considered % poll == 0 {
                    self.check_cancelled()?;
                }
                let (wp, wq) = (&current[p], &current[q]);
                if admissible_only && !self.constraints.admits_zero_masks(&wp.zeros, &wq.zeros) {
                    trace!("Inadmissible pair {} / {}", wp.ray, wq.ray);
                    self.stats.pairs_inadmissible += 1;
                    continue;
                }
                if dots[p].is_infinite() || dots[q].is_infinite() {
                    trace!("No finite intersection between {} and {}", wp.ray, wq.ray);
                    self.stats.pairs_unbounded += 1;
                    continue;
                }
                if !is_adjacent(&current, p, q) {
                    trace!("Non-adjacent pair {} / {}", wp.ray, wq.ray);
                    self.stats.pairs_non_adjacent += 1;
                    continue;
                }
                let ray = line_intersection(&wp.ray, &dots[p], &wq.ray, &dots[q])?;
                if registry.insert_if_new(ray) {
                    self.stats.intersections += 1;
                } else {
                    self.stats.duplicates_suppressed += 1;
                }
            }
        }
        debug!(
            "Hyperplane {}: {} pairs tried, {} new rays, {} duplicates, next generation has {}",
            row.index(),
            self.stats.pairs_considered - before.pairs_considered,
            self.stats.intersections - before.intersections,
            self.stats.duplicates_suppressed - before.duplicates_suppressed,
            registry.len()
        );

        drop(current);
        Ok(registry.take_rays().into_iter().map(WorkingRay::new).collect())
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            warn!(
                "Enumeration cancelled after {} hyperplanes",
                self.stats.hyperplanes_processed
            );
            return Err(RayEnumError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rays(rows: &[&[i64]]) -> Vec<RayVec> {
        rows.iter().map(|r| RayVec::from_i64s(r)).collect()
    }

    fn sorted(mut v: Vec<RayVec>) -> Vec<RayVec> {
        v.sort_by_key(|r| r.to_string());
        v
    }

    #[test]
    fn test_line_through_orthant() {
        let m = EqMatrix::from_rows(3, &[vec![1, -1, 0]]).unwrap();
        let c = ConstraintSet::empty();
        let out = Enumerator::for_orthant(&m, &c).run_to_vec().unwrap();
        assert_eq!(out, rays(&[&[0, 0, 1], &[1, 1, 0]]));
    }

    #[test]
    fn test_no_hyperplanes_returns_axes() {
        let m = EqMatrix::new(0, 3);
        let c = ConstraintSet::empty();
        let out = Enumerator::for_orthant(&m, &c).run_to_vec().unwrap();
        assert_eq!(out, Enumerator::orthant_axes(3));
    }

    #[test]
    fn test_single_hyperplane_through_simplex() {
        // x0 + x1 = x2 + x3: generated by e_i + e_j with i in {0, 1}, j in {2, 3}.
        let m = EqMatrix::from_rows(4, &[vec![1, 1, -1, -1]]).unwrap();
        let c = ConstraintSet::empty();
        let mut e = Enumerator::for_orthant(&m, &c);
        let mut out: Vec<RayVec> = Vec::new();
        let stats = e.run(&mut out).unwrap();
        assert_eq!(
            sorted(out),
            sorted(rays(&[&[1, 0, 1, 0], &[1, 0, 0, 1], &[0, 1, 1, 0], &[0, 1, 0, 1]]))
        );
        assert_eq!(stats.pairs_considered, 4);
        assert_eq!(stats.intersections, 4);
        assert_eq!(stats.pairs_non_adjacent, 0);
    }

    #[test]
    fn test_non_adjacent_pairs_are_skipped() {
        let m = EqMatrix::from_rows(4, &[vec![1, 1, -1, -1], vec![1, -1, 0, 0]]).unwrap();
        let c = ConstraintSet::empty();
        let mut e = Enumerator::for_orthant(&m, &c);
        let mut out: Vec<RayVec> = Vec::new();
        let stats = e.run(&mut out).unwrap();
        assert_eq!(sorted(out), sorted(rays(&[&[1, 1, 2, 0], &[1, 1, 0, 2]])));
        assert_eq!(stats.hyperplanes_processed, 2);
        assert_eq!(stats.pairs_considered, 8);
        assert_eq!(stats.pairs_non_adjacent, 2);
        assert_eq!(stats.intersections, 6);
        assert_eq!(stats.rays_emitted, 2);
    }

    #[test]
    fn test_line_intersection_lies_on_hyperplane() {
        let h = RayVec::from_i64s(&[2, -3, 1]);
        let p = RayVec::from_i64s(&[4, 0, 2]);
        let q = RayVec::from_i64s(&[0, 2, 0]);
        let dp = p.dot(&h).unwrap();
        let dq = q.dot(&h).unwrap();
        let r = line_intersection(&p, &dp, &q, &dq).unwrap();
        assert!(r.dot(&h).unwrap().is_zero());
        assert!(r.is_non_negative());
        assert!(r.is_primitive());
        assert!(line_intersection(&p, &BigInt::infinity(), &q, &dq).is_err());
    }

    #[test]
    fn test_rejects_second_run() {
        let m = EqMatrix::new(0, 2);
        let c = ConstraintSet::empty();
        let mut e = Enumerator::for_orthant(&m, &c);
        assert_eq!(e.state(), EnumeratorState::Ready);
        let mut out: Vec<RayVec> = Vec::new();
        e.run(&mut out).unwrap();
        assert_eq!(e.state(), EnumeratorState::Done);
        assert!(matches!(e.run(&mut out), Err(RayEnumError::InvalidOperation(_))));
    }

    #[test]
    fn test_invalid_generators() {
        let m = EqMatrix::from_rows(2, &[vec![1, -1]]).unwrap();
        let c = ConstraintSet::empty();
        for bad in [rays(&[&[1, 0, 0]]), rays(&[&[0, 0]]), rays(&[&[1, -1]])] {
            let mut e = Enumerator::new(&m, &c, bad);
            let err = e.run(&mut Vec::<RayVec>::new()).unwrap_err();
            assert!(matches!(err, RayEnumError::InvalidInput(_)), "{:?}", err);
            assert_eq!(e.state(), EnumeratorState::Done);
        }
        let out_of_range = ConstraintSet::empty().with_group([0, 2]);
        let err = Enumerator::for_orthant(&m, &out_of_range).run_to_vec().unwrap_err();
        assert!(matches!(err, RayEnumError::InvalidInput(_)));
    }

    #[test]
    fn test_duplicate_generators_collapse() {
        let m = EqMatrix::from_rows(2, &[vec![1, -1]]).unwrap();
        let c = ConstraintSet::empty();
        let gens = rays(&[&[1, 0], &[2, 0], &[0, 1]]);
        let mut e = Enumerator::new(&m, &c, gens);
        let mut out: Vec<RayVec> = Vec::new();
        let stats = e.run(&mut out).unwrap();
        assert_eq!(out, rays(&[&[1, 1]]));
        assert_eq!(stats.duplicates_suppressed, 1);
    }

    #[test]
    fn test_cancel_observed_while_pairing() {
        let m = EqMatrix::from_rows(4, &[vec![1, 1, -1, -1]]).unwrap();
        let c = ConstraintSet::empty();
        let mut e = Enumerator::for_orthant(&m, &c)
            .with_config(EnumerationConfig::new().cancel_poll_interval(3));
        let working = e.prepare_generators().unwrap();
        e.cancel_handle().cancel();

        let mut registry = RayRegistry::new();
        let row = m.row(0).unwrap();
        let err = e.intersect_hyperplane(working, row, &mut registry).err();
        assert_eq!(err, Some(RayEnumError::Cancelled));
        assert_eq!(e.stats().pairs_considered, 3);
        assert_eq!(e.stats().intersections, 2);
    }

    #[test]
    fn test_cancel_not_polled_between_sparse_checks() {
        let m = EqMatrix::from_rows(4, &[vec![1, 1, -1, -1]]).unwrap();
        let c = ConstraintSet::empty();
        let mut e = Enumerator::for_orthant(&m, &c)
            .with_config(EnumerationConfig::new().cancel_poll_interval(5));
        let working = e.prepare_generators().unwrap();
        e.cancel_handle().cancel();

        let mut registry = RayRegistry::new();
        let row = m.row(0).unwrap();
        let next = e.intersect_hyperplane(working, row, &mut registry).unwrap();
        assert_eq!(next.len(), 4);
        assert_eq!(e.stats().pairs_considered, 4);
    }

    #[test]
    fn test_cancelled_before_start() {
        let m = EqMatrix::from_rows(2, &[vec![1, -1]]).unwrap();
        let c = ConstraintSet::empty();
        let mut e = Enumerator::for_orthant(&m, &c);
        e.cancel_handle().cancel();
        let mut out: Vec<RayVec> = Vec::new();
        assert_eq!(e.run(&mut out), Err(RayEnumError::Cancelled));
        assert!(out.is_empty());
    }
}
