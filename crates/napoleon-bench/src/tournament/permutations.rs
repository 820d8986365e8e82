const SEATS: usize = 4;
const MAX_PERMUTATIONS: usize = 24;

/// Deterministic seatings for a 4-player table.
///
/// The four cyclic rotations come first so that any multiple of four seats every agent
/// in every seat equally often; the remaining orderings follow in generation order.
pub struct SeatPermutations {
    permutations: Vec<[usize; SEATS]>,
}

impl SeatPermutations {
    pub fn new(count: usize) -> Self {
        let limit = count.min(MAX_PERMUTATIONS);
        let mut permutations: Vec<[usize; SEATS]> = (0..SEATS)
            .map(|shift| std::array::from_fn(|seat| (seat + shift) % SEATS))
            .collect();

        let mut all = Vec::with_capacity(MAX_PERMUTATIONS);
        let mut base = [0usize, 1, 2, 3];
        generate(&mut base, 0, &mut all);
        for permutation in all {
            if !permutations.contains(&permutation) {
                permutations.push(permutation);
            }
        }
        permutations.truncate(limit);
        Self { permutations }
    }

    pub fn as_slice(&self) -> &[[usize; SEATS]] {
        &self.permutations
    }

    pub const fn max() -> usize {
        MAX_PERMUTATIONS
    }
}

fn generate(data: &mut [usize; SEATS], start: usize, output: &mut Vec<[usize; SEATS]>) {
    if start == data.len() - 1 {
        output.push(*data);
        return;
    }

    for idx in start..data.len() {
        data.swap(start, idx);
        generate(data, start + 1, output);
        data.swap(start, idx);
    }
}
