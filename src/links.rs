//! Optical inter-satellite link topology.
//!
//! Every tick each visible satellite links to at most `max_neighbors` of its
//! nearest visible peers within range. Edges are directed: a mutual pair
//! yields two edges, one from each end, and the renderer colors the
//! outgoing and incoming endpoints differently.
//!
//! The search is a brute-force O(n^2) pass per tick. That is fine for a few
//! hundred satellites and is the scaling limit of this module; see
//! `benches/links_bench.rs`.

use egui::Color32;
use nalgebra::Vector3;

pub const OUTGOING_COLOR: Color32 = Color32::from_rgb(0xff, 0x33, 0x00);
pub const INCOMING_COLOR: Color32 = Color32::from_rgb(0x00, 0xff, 0xff);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkEdge {
    pub source: usize,
    pub target: usize,
    pub distance: f64,
}

/// One drawable line segment with per-endpoint colors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkSegment {
    pub start: Vector3<f64>,
    pub end: Vector3<f64>,
    pub start_color: Color32,
    pub end_color: Color32,
}

pub struct LinkTopologyBuilder {
    range_sq: f64,
    max_neighbors: usize,
    candidates: Vec<(usize, f64)>,
}

impl LinkTopologyBuilder {
    pub fn new(range: f64, max_neighbors: usize) -> Self {
        Self {
            range_sq: range * range,
            max_neighbors,
            candidates: Vec::new(),
        }
    }

    /// Replaces `edges` with this tick's topology. `positions[i]` belongs to
    /// satellite `i`; `None` entries neither link nor get linked to.
    ///
    /// Edges come out grouped by ascending source, nearest target first.
    /// Equal distances keep ascending target order.
    pub fn build(&mut self, positions: &[Option<Vector3<f64>>], edges: &mut Vec<LinkEdge>) {
        edges.clear();
        if self.max_neighbors == 0 {
            return;
        }

        for (i, p1) in positions.iter().enumerate() {
            let Some(p1) = p1 else { continue };

            self.candidates.clear();
            for (j, p2) in positions.iter().enumerate() {
                if i == j { continue; }
                let Some(p2) = p2 else { continue };
                let dist_sq = (p1 - p2).norm_squared();
                if dist_sq <= self.range_sq {
                    self.candidates.push((j, dist_sq));
                }
            }

            self.candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
            self.candidates.truncate(self.max_neighbors);

            edges.extend(self.candidates.iter().map(|&(j, dist_sq)| LinkEdge {
                source: i,
                target: j,
                distance: dist_sq.sqrt(),
            }));
        }
    }
}

/// Materializes edges as segments, outgoing endpoint first.
pub fn link_segments<'a>(
    edges: &'a [LinkEdge],
    positions: &'a [Option<Vector3<f64>>],
) -> impl Iterator<Item = LinkSegment> + 'a {
    edges.iter().filter_map(move |e| {
        let start = positions.get(e.source).copied().flatten()?;
        let end = positions.get(e.target).copied().flatten()?;
        Some(LinkSegment {
            start,
            end,
            start_color: OUTGOING_COLOR,
            end_color: INCOMING_COLOR,
        })
    })
}
