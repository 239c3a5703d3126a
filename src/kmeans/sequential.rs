use super::lloyd::{Accumulator, LoopControl};
use crate::distance::nearest_center;
use ndarray::{Array2, ArrayView2};

/// Run Lloyd passes on the host until `control` stops the loop.
/// Returns the delta of the final pass.
pub(crate) fn run(
    points: ArrayView2<f64>,
    centers: &mut Array2<f64>,
    membership: &mut [usize],
    control: &mut LoopControl,
) -> f64 {
    let (n, dim) = points.dim();
    let mut acc = Accumulator::new(centers.nrows(), dim);

    loop {
        for (i, point) in points.rows().into_iter().enumerate() {
            let cluster = nearest_center(point, centers.view());
            acc.assign(membership, i, cluster, point);
        }

        let delta = acc.finish_pass(centers, n);
        if !control.next(delta) {
            return delta;
        }
    }
}
