use ndarray::Array2;

/// Statistics for a single 8-connected foreground region.
#[derive(Clone, Debug)]
pub struct ComponentStats {
    /// Resolved label of this component in [`LabelMap::labels`].
    pub label: u32,
    /// Number of pixels in the component.
    pub area: usize,
    /// Bounding box: (min_row, max_row, min_col, max_col).
    pub bbox: (usize, usize, usize, usize),
    /// First pixel of the component in raster order, `(row, col)`.
    /// Always lies on the component's outer border.
    pub origin: (usize, usize),
}

/// Resolved label image plus per-component statistics.
#[derive(Clone, Debug)]
pub struct LabelMap {
    /// 0 = background, otherwise the component's resolved label.
    pub labels: Array2<u32>,
    /// Components in order of discovery (raster order of their origins).
    pub components: Vec<ComponentStats>,
}

/// Label 8-connected foreground regions with two-pass union-find.
pub fn label_components(mask: &Array2<bool>) -> LabelMap {
    let (h, w) = mask.dim();
    let mut labels = Array2::<u32>::zeros((h, w));
    if h == 0 || w == 0 {
        return LabelMap {
            labels,
            components: Vec::new(),
        };
    }

    let mut next_label: u32 = 1;
    // Union-find parent array. Index 0 unused; labels start at 1.
    let mut parent: Vec<u32> = vec![0; h * w / 2 + 2];

    // Pass 1: provisional labels from the already-visited neighbours
    // (west, north-west, north, north-east).
    for row in 0..h {
        for col in 0..w {
            if !mask[[row, col]] {
                continue;
            }

            let mut neighbours = [0u32; 4];
            if col > 0 {
                neighbours[0] = labels[[row, col - 1]];
            }
            if row > 0 {
                if col > 0 {
                    neighbours[1] = labels[[row - 1, col - 1]];
                }
                neighbours[2] = labels[[row - 1, col]];
                if col + 1 < w {
                    neighbours[3] = labels[[row - 1, col + 1]];
                }
            }

            match neighbours.iter().copied().filter(|&l| l > 0).min() {
                None => {
                    if next_label as usize >= parent.len() {
                        parent.resize(parent.len() * 2, 0);
                    }
                    parent[next_label as usize] = next_label;
                    labels[[row, col]] = next_label;
                    next_label += 1;
                }
                Some(smallest) => {
                    labels[[row, col]] = smallest;
                    for &other in neighbours.iter().filter(|&&l| l > 0 && l != smallest) {
                        union(&mut parent, smallest, other);
                    }
                }
            }
        }
    }

    // Flatten parent references.
    for i in 1..next_label as usize {
        parent[i] = find(&parent, i as u32);
    }

    // Pass 2: resolve labels and collect stats in discovery order.
    let mut slot_of_root = std::collections::HashMap::<u32, usize>::new();
    let mut components: Vec<ComponentStats> = Vec::new();

    for row in 0..h {
        for col in 0..w {
            let lbl = labels[[row, col]];
            if lbl == 0 {
                continue;
            }
            let root = parent[lbl as usize];
            labels[[row, col]] = root;

            let slot = *slot_of_root.entry(root).or_insert_with(|| {
                components.push(ComponentStats {
                    label: root,
                    area: 0,
                    bbox: (row, row, col, col),
                    origin: (row, col),
                });
                components.len() - 1
            });

            let entry = &mut components[slot];
            entry.area += 1;
            entry.bbox.0 = entry.bbox.0.min(row);
            entry.bbox.1 = entry.bbox.1.max(row);
            entry.bbox.2 = entry.bbox.2.min(col);
            entry.bbox.3 = entry.bbox.3.max(col);
        }
    }

    LabelMap { labels, components }
}

/// Number of foreground pixels in a mask.
pub fn foreground_count(mask: &Array2<bool>) -> usize {
    mask.iter().filter(|&&v| v).count()
}

fn find(parent: &[u32], mut x: u32) -> u32 {
    while parent[x as usize] != x {
        x = parent[x as usize];
    }
    x
}

fn union(parent: &mut [u32], a: u32, b: u32) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        // Merge larger root into smaller root to keep labels consistent.
        let (small, big) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[big as usize] = small;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_pixels_are_one_component() {
        let mut mask = Array2::from_elem((4, 4), false);
        mask[[0, 0]] = true;
        mask[[1, 1]] = true;
        mask[[2, 2]] = true;
        let map = label_components(&mask);
        assert_eq!(map.components.len(), 1);
        assert_eq!(map.components[0].area, 3);
    }

    #[test]
    fn u_shape_merges_under_union_find() {
        // Two vertical arms joined at the bottom: provisional labels differ.
        let mut mask = Array2::from_elem((4, 5), false);
        for row in 0..4 {
            mask[[row, 0]] = true;
            mask[[row, 4]] = true;
        }
        for col in 0..5 {
            mask[[3, col]] = true;
        }
        let map = label_components(&mask);
        assert_eq!(map.components.len(), 1);
        assert_eq!(map.components[0].origin, (0, 0));
        assert_eq!(map.components[0].bbox, (0, 3, 0, 4));
    }

    #[test]
    fn components_in_discovery_order() {
        let mut mask = Array2::from_elem((6, 6), false);
        mask[[4, 0]] = true;
        mask[[1, 4]] = true;
        let map = label_components(&mask);
        assert_eq!(map.components.len(), 2);
        assert_eq!(map.components[0].origin, (1, 4));
        assert_eq!(map.components[1].origin, (4, 0));
    }
}
