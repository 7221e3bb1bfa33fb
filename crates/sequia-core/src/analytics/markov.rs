// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Sequia.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Markov chain over the five discrete drought states.
//!
//! The transition matrix is estimated by MLE on consecutive-month state
//! counts; rows whose state never occurred stay uniform, keeping every row
//! stochastic. Cheap to refit, so it is recomputed per request.

use sequia_types::DroughtState;

const N: usize = 5;

pub type TransitionMatrix = [[f64; N]; N];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkovSummary {
    pub state: DroughtState,
    pub prob_to_severe: f64,
    pub prob_to_extreme: f64,
    pub prob_worsening_1m: f64,
    pub prob_to_severe_2m: f64,
    pub prob_to_extreme_2m: f64,
}

#[derive(Debug, Clone, Default)]
pub struct MarkovAnalyzer {
    matrix: Option<TransitionMatrix>,
}

impl MarkovAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Estimate the transition matrix from an SPI series.
    pub fn fit(&mut self, series: &[f64]) -> &TransitionMatrix {
        let mut counts = [[0.0f64; N]; N];
        if series.len() >= 2 {
            for w in series.windows(2) {
                let from = DroughtState::from_spi(w[0]).index();
                let to = DroughtState::from_spi(w[1]).index();
                counts[from][to] += 1.0;
            }
        }

        let mut matrix = [[0.0f64; N]; N];
        for (row, count_row) in counts.iter().enumerate() {
            let total: f64 = count_row.iter().sum();
            if total == 0.0 {
                // Unobserved state: uniform row keeps the matrix stochastic.
                matrix[row] = [1.0 / N as f64; N];
            } else {
                for col in 0..N {
                    matrix[row][col] = count_row[col] / total;
                }
            }
        }

        self.matrix.insert(matrix)
    }

    pub fn matrix(&self) -> Option<&TransitionMatrix> {
        self.matrix.as_ref()
    }

    /// P(target | current, steps). Zero when unfitted.
    pub fn transition_probability(
        &self,
        current: DroughtState,
        target: DroughtState,
        steps: u32,
    ) -> f64 {
        let Some(matrix) = self.matrix else {
            return 0.0;
        };
        let powered = matrix_power(&matrix, steps);
        powered[current.index()][target.index()]
    }

    /// Probability of landing in any strictly drier state after `steps`.
    pub fn worsening_probability(&self, current: DroughtState, steps: u32) -> f64 {
        let Some(matrix) = self.matrix else {
            return 0.0;
        };
        let idx = current.index();
        if idx >= N - 1 {
            return 0.0;
        }
        let powered = matrix_power(&matrix, steps);
        powered[idx][idx + 1..].iter().sum()
    }

    /// Fit on history and summarize the transition risk from the current SPI.
    pub fn analyze(&mut self, current_spi: f64, series: &[f64]) -> MarkovSummary {
        self.fit(series);
        let state = DroughtState::from_spi(current_spi);
        MarkovSummary {
            state,
            prob_to_severe: self.transition_probability(state, DroughtState::Severe, 1),
            prob_to_extreme: self.transition_probability(state, DroughtState::Extreme, 1),
            prob_worsening_1m: self.worsening_probability(state, 1),
            prob_to_severe_2m: self.transition_probability(state, DroughtState::Severe, 2),
            prob_to_extreme_2m: self.transition_probability(state, DroughtState::Extreme, 2),
        }
    }
}

fn matrix_power(matrix: &TransitionMatrix, steps: u32) -> TransitionMatrix {
    let mut result = identity();
    for _ in 0..steps.max(1) {
        result = multiply(&result, matrix);
    }
    result
}

fn identity() -> TransitionMatrix {
    let mut m = [[0.0; N]; N];
    for (i, row) in m.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    m
}

fn multiply(a: &TransitionMatrix, b: &TransitionMatrix) -> TransitionMatrix {
    let mut out = [[0.0; N]; N];
    for i in 0..N {
        for k in 0..N {
            let aik = a[i][k];
            if aik == 0.0 {
                continue;
            }
            for j in 0..N {
                out[i][j] += aik * b[k][j];
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_stochastic() {
        let series = [0.5, -0.7, -1.2, -1.7, -2.2, -1.4, -0.3, 0.2, -0.8, -1.3];
        let mut analyzer = MarkovAnalyzer::new();
        let matrix = analyzer.fit(&series);
        for row in matrix {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "row sum = {sum}");
        }
    }

    #[test]
    fn unobserved_states_get_uniform_rows() {
        // Series never reaches extreme; its row must still sum to one.
        let series = [0.5, 0.2, -0.6, -0.2];
        let mut analyzer = MarkovAnalyzer::new();
        let matrix = analyzer.fit(&series);
        let extreme = matrix[DroughtState::Extreme.index()];
        for p in extreme {
            assert!((p - 0.2).abs() < 1e-12);
        }
    }

    #[test]
    fn deterministic_chain_predicts_its_cycle() {
        // normal -> mild -> normal -> mild ...
        let series = [0.2, -0.7, 0.2, -0.7, 0.2, -0.7];
        let mut analyzer = MarkovAnalyzer::new();
        analyzer.fit(&series);
        let p = analyzer.transition_probability(DroughtState::Normal, DroughtState::Mild, 1);
        assert!((p - 1.0).abs() < 1e-12);
        // Two steps returns to normal.
        let p2 = analyzer.transition_probability(DroughtState::Normal, DroughtState::Normal, 2);
        assert!((p2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn worsening_sums_strictly_drier_states() {
        let series = [-0.7, -1.2, -0.7, -1.7, -0.7, -0.2];
        let mut analyzer = MarkovAnalyzer::new();
        analyzer.fit(&series);
        let p = analyzer.worsening_probability(DroughtState::Mild, 1);
        // From mild, 2 of 3 observed transitions went drier.
        assert!((p - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(analyzer.worsening_probability(DroughtState::Extreme, 1), 0.0);
    }

    #[test]
    fn unfitted_analyzer_returns_zero() {
        let analyzer = MarkovAnalyzer::new();
        assert_eq!(
            analyzer.transition_probability(DroughtState::Mild, DroughtState::Severe, 1),
            0.0
        );
    }

    #[test]
    fn analyze_fills_summary() {
        let series = [-0.7, -1.2, -1.7, -1.2, -1.7, -2.1, -1.6, -1.8];
        let mut analyzer = MarkovAnalyzer::new();
        let summary = analyzer.analyze(-1.8, &series);
        assert_eq!(summary.state, DroughtState::Severe);
        assert!(summary.prob_to_severe >= 0.0 && summary.prob_to_severe <= 1.0);
        assert!(summary.prob_worsening_1m >= 0.0 && summary.prob_worsening_1m <= 1.0);
    }
}
