mod common;

use std::collections::HashSet;

use proptest::prelude::*;

use common::desc;
use microdnn::tensor::{Layout, MemoryFormat, Precision, Tensor, TensorDesc};
use microdnn::PrimitiveError;

/// Every logical index maps to a distinct offset, and together they cover 0..nelems.
fn assert_bijection(d: &TensorDesc) {
    let mut seen = HashSet::new();
    let mut count = 0usize;
    d.for_each_index(|idx| {
        let off = d.offset(idx);
        assert!(off < d.nelems(), "{}: offset {} out of range for {:?}", d, off, idx);
        assert!(seen.insert(off), "{}: offset {} hit twice ({:?})", d, off, idx);
        count += 1;
    });
    assert_eq!(count, d.nelems());
    assert_eq!(seen.len(), d.nelems());
}

fn dims_for(format: MemoryFormat) -> Vec<usize> {
    match format.ndims() {
        1 => vec![7],
        2 => vec![3, 5],
        _ => vec![2, 32, 3, 4],
    }
}

#[test]
fn named_formats_are_bijections() {
    for format in MemoryFormat::ALL {
        assert_bijection(&desc(&dims_for(format), format));
    }
}

#[test]
fn linear_index_matches_multi_index() {
    for format in MemoryFormat::ALL {
        let d = desc(&dims_for(format), format);
        let mut linear = 0;
        d.for_each_index(|idx| {
            assert_eq!(d.offset_of_linear(linear), d.offset(idx), "{} at {:?}", d, idx);
            linear += 1;
        });
    }
}

#[test]
fn nchw8c_layout_matches_hand_computed_offsets() {
    // physical dims: n, C/8, h, w, 8c
    let d = desc(&[2, 16, 3, 4], MemoryFormat::NChw8c);
    let (c_outer_stride, h_stride, w_stride) = (3 * 4 * 8, 4 * 8, 8);
    let n_stride = 2 * c_outer_stride;
    for n in 0..2 {
        for c in 0..16 {
            for h in 0..3 {
                for w in 0..4 {
                    let expected =
                        n * n_stride + (c / 8) * c_outer_stride + h * h_stride + w * w_stride + c % 8;
                    assert_eq!(d.offset(&[n, c, h, w]), expected);
                }
            }
        }
    }
}

#[test]
fn oihw8i_blocks_input_channels() {
    let d = desc(&[4, 16, 2, 2], MemoryFormat::OIhw8i);
    // consecutive input channels within a block are adjacent
    assert_eq!(d.offset(&[1, 3, 1, 0]) + 1, d.offset(&[1, 4, 1, 0]));
    // output channel is outermost
    assert_eq!(d.offset(&[1, 0, 0, 0]), 16 * 2 * 2);
}

#[test]
fn channel_extent_33_rejected_for_blocked_layout() {
    let err = TensorDesc::new(&[2, 33, 6, 6], Precision::F32, MemoryFormat::NChw8c).unwrap_err();
    assert_eq!(err, PrimitiveError::IndivisibleBlock { channels: 33, block: 8 });
    assert!(TensorDesc::new(&[2, 33, 6, 6], Precision::F32, MemoryFormat::Nchw).is_ok());
}

#[test]
fn rank_must_match_format() {
    let err = TensorDesc::new(&[2, 32], Precision::F32, MemoryFormat::Nchw).unwrap_err();
    assert!(matches!(err, PrimitiveError::RankMismatch { expected: 4, got: 2, .. }));
}

#[test]
fn blocked_layout_of_flat_tensor_rejected() {
    let layout = Layout::Blocked { order: vec![0], block: 4 };
    assert!(TensorDesc::with_layout(&[8], Precision::F32, layout).is_err());
}

#[test]
fn logical_content_survives_layout_changes() {
    let plain = desc(&[2, 16, 3, 3], MemoryFormat::Nchw);
    let t = Tensor::from_fn(plain, |i| (i[0] * 1000 + i[1] * 100 + i[2] * 10 + i[3]) as f32);
    for format in [MemoryFormat::Nhwc, MemoryFormat::NChw8c, MemoryFormat::NChw16c] {
        let other = t.reorder_to(&desc(&[2, 16, 3, 3], format)).unwrap();
        assert_eq!(other.to_logical_vec(), t.to_logical_vec(), "{}", format);
    }
}

fn layout_strategy() -> impl Strategy<Value = (Vec<usize>, Layout)> {
    (1usize..=4)
        .prop_flat_map(|rank| {
            (
                proptest::collection::vec(1usize..=4, rank),
                Just((0..rank).collect::<Vec<_>>()).prop_shuffle(),
                prop_oneof![Just(None), (1usize..=4).prop_map(Some)],
            )
        })
        .prop_map(|(mut dims, order, block)| match block {
            Some(k) if dims.len() > 1 => {
                dims[1] *= k;
                (dims, Layout::Blocked { order, block: k })
            }
            _ => (dims, Layout::Plain { order }),
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn custom_layouts_are_bijections((dims, layout) in layout_strategy()) {
        let d = TensorDesc::with_layout(&dims, Precision::F32, layout).unwrap();
        let mut offsets = Vec::with_capacity(d.nelems());
        d.for_each_index(|idx| offsets.push(d.offset(idx)));
        offsets.sort_unstable();
        let expected: Vec<usize> = (0..d.nelems()).collect();
        prop_assert_eq!(offsets, expected);
    }

    #[test]
    fn indivisible_block_always_rejected(channels in 1usize..64, block in 2usize..17) {
        prop_assume!(channels % block != 0);
        let layout = Layout::Blocked { order: vec![0, 1, 2, 3], block };
        let err = TensorDesc::with_layout(&[1, channels, 2, 2], Precision::F32, layout).unwrap_err();
        prop_assert_eq!(err, PrimitiveError::IndivisibleBlock { channels, block });
    }
}
