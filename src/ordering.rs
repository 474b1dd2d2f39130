//! Visually-coherent palette ordering.
//!
//! Multi-start greedy nearest-neighbor walk over the Euclidean RGB
//! distance matrix: every index is tried as the starting node and the
//! cheapest resulting tour wins. A heuristic approximation of the shortest
//! Hamiltonian path, O(n^3); palettes top out in the low hundreds so this
//! is plenty.

use crate::color::Color;

/// Reorder `colors` along the cheapest greedy nearest-neighbor path.
/// Always returns a permutation of the input.
pub fn sort_colors(colors: &[Color]) -> Vec<Color> {
    let n = colors.len();
    let mut matrix = vec![0.0f64; n * n];
    for y in 0..n {
        for x in (y + 1)..n {
            let distance = colors[x].distance(colors[y]);
            matrix[y * n + x] = distance;
            matrix[x * n + y] = distance;
        }
    }

    nearest_neighbour_path(&matrix, n)
        .into_iter()
        .map(|index| colors[index])
        .collect()
}

/// Cheapest greedy tour over the distance matrix, trying every start node.
/// Ties (both for the next hop and between tours) go to the lower index,
/// so equal-cost inputs keep their original order.
fn nearest_neighbour_path(matrix: &[f64], node_count: usize) -> Vec<usize> {
    let mut shortest_path = vec![0usize; node_count];
    let mut shortest_cost = f64::MAX;

    let mut path = vec![0usize; node_count];
    let mut visited = vec![false; node_count];

    for start in 0..node_count {
        visited.fill(false);
        visited[start] = true;
        path[0] = start;

        let mut cost = 0.0f64;
        for node in 1..node_count {
            let mut closest = f64::MAX;
            for candidate in 0..node_count {
                let distance = matrix[path[node - 1] * node_count + candidate];
                if !visited[candidate] && distance < closest {
                    closest = distance;
                    path[node] = candidate;
                }
            }
            visited[path[node]] = true;
            cost += closest;
        }

        if cost < shortest_cost {
            shortest_cost = cost;
            shortest_path.copy_from_slice(&path);
        }
    }

    shortest_path
}

/// Component-wise mean of A,R,G,B, truncated to 8 bits per channel. Used
/// when merging palette entries. An empty input averages to transparent
/// black.
pub fn average(colors: &[Color]) -> Color {
    if colors.is_empty() {
        return Color::from_argb(0, 0, 0, 0);
    }

    let count = colors.len() as u32;
    let mut sum = [0u32; 4];
    for color in colors {
        sum[0] += color.a as u32;
        sum[1] += color.r as u32;
        sum[2] += color.g as u32;
        sum[3] += color.b as u32;
    }

    Color::from_argb(
        (sum[0] / count) as u8,
        (sum[1] / count) as u8,
        (sum[2] / count) as u8,
        (sum[3] / count) as u8,
    )
}
