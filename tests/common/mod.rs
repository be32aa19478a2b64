#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use microdnn::primitive::ShapeParams;
use microdnn::tensor::{MemoryFormat, Precision, Tensor, TensorDesc};

/// Route library logs to the test harness; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn desc(dims: &[usize], format: MemoryFormat) -> TensorDesc {
    TensorDesc::new(dims, Precision::F32, format).unwrap()
}

/// Tensor with seeded random content in [-1, 1).
pub fn random_tensor(desc: TensorDesc, seed: u64) -> Tensor {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut t = Tensor::zeros(desc);
    for v in t.data_mut() {
        *v = rng.gen_range(-1.0f32..1.0);
    }
    t
}

/// Compare two output slices with a given tolerance.
pub fn assert_approx_eq(a: &[f32], b: &[f32], tol: f32, label: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch {} vs {}", label, a.len(), b.len());
    for (i, (va, vb)) in a.iter().zip(b.iter()).enumerate() {
        assert!(
            (va - vb).abs() < tol,
            "{}: mismatch at index {}: {} vs {} (diff={})",
            label, i, va, vb, (va - vb).abs()
        );
    }
}

/// Independent inner product: flat logical indices resolved through each
/// operand's linear-index mapping. Accumulates directly into `dst`.
pub fn compute_ref_inner_product_fwd(
    shape: ShapeParams,
    src: &Tensor,
    weights: &Tensor,
    bias: Option<&Tensor>,
    dst: &mut Tensor,
) {
    let ShapeParams { mb, ic, oc, kh, kw } = shape;
    let dst_desc = dst.desc().clone();
    for n in 0..mb {
        for o in 0..oc {
            let oidx = dst_desc.offset_of_linear(n * oc + o);
            dst.data_mut()[oidx] = match bias {
                Some(b) => b.data()[b.desc().offset_of_linear(o)],
                None => 0.0,
            };
            for c in 0..ic {
                for h in 0..kh {
                    for w in 0..kw {
                        let iidx = n * ic * kh * kw + c * kh * kw + h * kw + w;
                        let widx = o * ic * kh * kw + c * kh * kw + h * kw + w;
                        let s = src.data()[src.desc().offset_of_linear(iidx)];
                        let wt = weights.data()[weights.desc().offset_of_linear(widx)];
                        dst.data_mut()[oidx] += s * wt;
                    }
                }
            }
        }
    }
}
