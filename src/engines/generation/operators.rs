use rand::Rng;

// Both selectors take fitness distances (lower is better) and return an
// index into the same slice. The slice must not be empty.

/// Tournament selection: lowest distance among `tournament_size` uniform draws
pub fn tournament_selection<R: Rng>(
    fitnesses: &[f64],
    tournament_size: usize,
    rng: &mut R,
) -> usize {
    let mut best_idx = rng.gen_range(0..fitnesses.len());
    let mut best_fitness = fitnesses[best_idx];

    for _ in 1..tournament_size {
        let idx = rng.gen_range(0..fitnesses.len());
        if fitnesses[idx] < best_fitness {
            best_idx = idx;
            best_fitness = fitnesses[idx];
        }
    }

    best_idx
}

/// Roulette wheel selection weighted by how far each individual is from the
/// worst one. The worst individual gets zero weight. When every weight is
/// zero the pick is uniform.
pub fn roulette_selection<R: Rng>(fitnesses: &[f64], rng: &mut R) -> usize {
    let worst = fitnesses.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut total = 0.0;
    let cumulative: Vec<f64> = fitnesses
        .iter()
        .map(|f| {
            total += worst - f;
            total
        })
        .collect();

    if !(total > 0.0) {
        return rng.gen_range(0..fitnesses.len());
    }

    let spin = rng.gen::<f64>();
    cumulative
        .iter()
        .position(|c| c / total > spin)
        .unwrap_or(0)
}
