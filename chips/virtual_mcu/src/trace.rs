// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Record of every change on the driven output lines, as a logic analyzer
//! attached to the servo headers would capture it.

/// The driven port value changed to `value` at `cycle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub cycle: u64,
    pub value: u8,
}

/// One complete high period on a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pulse {
    pub rise: u64,
    pub fall: u64,
}

impl Pulse {
    pub fn high_cycles(&self) -> u64 {
        self.fall - self.rise
    }

    /// Whether the two high periods share any instant.
    pub fn overlaps(&self, other: &Pulse) -> bool {
        self.rise < other.fall && other.rise < self.fall
    }
}

pub struct EdgeTrace {
    edges: Vec<Edge>,
    start: u8,
    current: u8,
}

impl EdgeTrace {
    pub fn new(initial: u8) -> EdgeTrace {
        EdgeTrace {
            edges: Vec::new(),
            start: initial,
            current: initial,
        }
    }

    /// Record the driven value at `cycle`. Writes that do not change the
    /// driven value leave no edge.
    pub fn record(&mut self, cycle: u64, value: u8) {
        if value != self.current {
            self.edges.push(Edge { cycle, value });
            self.current = value;
        }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Forget the recorded edges, keeping the current line levels.
    pub fn clear(&mut self) {
        self.edges.clear();
        self.start = self.current;
    }

    /// Complete pulses on the lines in `mask`, in order of their rising edge.
    ///
    /// A pulse still high at the end of the trace is left out, as is a line
    /// already high when recording started.
    pub fn pulses(&self, mask: u8) -> Vec<Pulse> {
        let mut pulses = Vec::new();
        let mut level = self.start & mask;
        let mut rise = None;
        for edge in &self.edges {
            let next = edge.value & mask;
            if level == 0 && next != 0 {
                rise = Some(edge.cycle);
            } else if level != 0 && next == 0 {
                if let Some(start) = rise.take() {
                    pulses.push(Pulse {
                        rise: start,
                        fall: edge.cycle,
                    });
                }
            }
            level = next;
        }
        pulses
    }
}

/// Rising-edge to rising-edge distances between consecutive pulses.
pub fn intervals(pulses: &[Pulse]) -> Vec<u64> {
    pulses
        .windows(2)
        .map(|pair| pair[1].rise - pair[0].rise)
        .collect()
}
