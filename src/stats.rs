/*
 * Statistics Module
 *
 * Read-only views derived from a list of positions and velocities:
 * - FlockStats: mean velocity and polarization, refreshed every tick
 * - CorrelationHistogram: velocity-fluctuation correlation against distance,
 *   rebuilt from scratch whenever it is requested
 */

use nannou::prelude::Vec2;

use crate::topology::{Domain, Topology};
use crate::vector::unit_or_zero;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlockStats {
    pub agent_count: usize,
    pub mean_velocity: Vec2,
    // Length of the mean unit heading; 1 for a perfectly aligned flock
    pub polarization: f32,
}

impl FlockStats {
    pub fn from_velocities(velocities: &[Vec2]) -> Self {
        if velocities.is_empty() {
            return Self::default();
        }
        let count = velocities.len() as f32;
        let mean_velocity = velocities.iter().sum::<Vec2>() / count;
        let mean_heading = velocities
            .iter()
            .map(|&v| unit_or_zero(v))
            .fold(Vec2::ZERO, |total, heading| total + heading)
            / count;

        Self {
            agent_count: velocities.len(),
            mean_velocity,
            polarization: mean_heading.length().min(1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationHistogram {
    interval: f32,
    sums: Vec<f32>,
    counts: Vec<u32>,
}

impl CorrelationHistogram {
    pub fn empty(interval: f32, bucket_count: usize) -> Self {
        Self {
            interval,
            sums: vec![0.0; bucket_count],
            counts: vec![0; bucket_count],
        }
    }

    // Accumulate (v_i - mean) . (v_j - mean) over every ordered pair of
    // distinct agents, bucketed by their distance under the topology
    pub fn build(
        positions: &[Vec2],
        velocities: &[Vec2],
        mean_velocity: Vec2,
        topology: Topology,
        domain: Domain,
        interval: f32,
        bucket_count: usize,
    ) -> Self {
        assert_eq!(
            positions.len(),
            velocities.len(),
            "position and velocity lists differ in length"
        );

        let mut histogram = Self::empty(interval, bucket_count);
        let fluctuations: Vec<Vec2> = velocities.iter().map(|&v| v - mean_velocity).collect();
        let max_distance = interval * bucket_count as f32;

        for (i, &from) in positions.iter().enumerate() {
            for (j, &to) in positions.iter().enumerate() {
                if i == j {
                    continue;
                }
                let distance = topology.relative_displacement(domain, from, to).length();
                if distance >= max_distance {
                    continue;
                }
                let bucket = ((distance / interval) as usize).min(bucket_count - 1);
                histogram.sums[bucket] += fluctuations[i].dot(fluctuations[j]);
                histogram.counts[bucket] += 1;
            }
        }

        histogram
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn bucket_count(&self) -> usize {
        self.sums.len()
    }

    pub fn sum(&self, bucket: usize) -> f32 {
        self.sums[bucket]
    }

    pub fn count(&self, bucket: usize) -> u32 {
        self.counts[bucket]
    }

    // Lower distance edge of a bucket
    pub fn bucket_start(&self, bucket: usize) -> f32 {
        bucket as f32 * self.interval
    }

    // Mean correlation per bucket; empty buckets read as zero
    pub fn mean(&self) -> Vec<f32> {
        self.sums
            .iter()
            .zip(&self.counts)
            .map(|(&sum, &count)| if count == 0 { 0.0 } else { sum / count as f32 })
            .collect()
    }

    // Means scaled so that the largest is 1
    pub fn normalized(&self) -> Vec<f32> {
        let means = self.mean();
        let max = means.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        if max > 0.0 {
            means.iter().map(|m| m / max).collect()
        } else {
            vec![0.0; means.len()]
        }
    }
}
