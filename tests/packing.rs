use gebp::kernel::{gebp, mr, unpacked_len};
use gebp::pack::{pack_lhs, pack_rhs, pack_rhs_row_major};
use gebp::tiling::{col_tiles, row_bands};
use gebp::{ColMajor, NoConj, Packet, RowMajor, Scalar, MR_PACKETS, NR};
use num::Complex;
use rand::prelude::*;

type F32Packet = <f32 as Scalar>::Packet;

fn random_f32(rng: &mut StdRng, len: usize) -> Vec<f32> {
    // Quarter steps keep every product and partial sum exact.
    (0..len).map(|_| rng.random_range(-8i32..8) as f32 * 0.25).collect()
}

fn naive(a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    let mut c = vec![0.0; m * n];
    for j in 0..n {
        for p in 0..k {
            for i in 0..m {
                c[j * m + i] += a[p * m + i] * b[j * k + p];
            }
        }
    }
    c
}

#[test]
fn test_kernel_boundaries_with_default_packet() {
    let mr = mr::<F32Packet, MR_PACKETS>();
    let lanes = <F32Packet as Packet>::LANES;
    let mut rng = StdRng::seed_from_u64(11);
    let sentinel = f32::MAX;

    for m in [mr, mr + 1, 2 * mr - 1, mr + lanes, 2 * mr + lanes + 1] {
        for n in [NR, NR + 1, 2 * NR - 1] {
            for k in [1, 4, 7] {
                let a = random_f32(&mut rng, m * k);
                let b = random_f32(&mut rng, k * n);

                // Every buffer gets a guard tail that must survive.
                let guard = 5;
                let mut block_a = vec![sentinel; m * k + guard];
                let mut block_b = vec![sentinel; k * n + guard];
                let mut unpacked = vec![sentinel; unpacked_len::<F32Packet, NR>(k) + guard];
                let ld = m + 3;
                let mut res = vec![sentinel; ld * n + guard];
                for j in 0..n {
                    res[j * ld..j * ld + m].fill(0.0);
                }

                unsafe {
                    pack_lhs::<F32Packet, ColMajor, MR_PACKETS, false, false>(
                        &mut block_a, &a, m, k, m, 0, 0,
                    );
                    pack_rhs::<f32, ColMajor, NR, false>(&mut block_b, &b, k, 1.0, k, n, 0, 0);
                    gebp::<F32Packet, NoConj, MR_PACKETS, NR>(
                        &mut res, ld, &block_a, &block_b, m, k, n, None, None, 0, 0, &mut unpacked,
                    );
                }

                assert!(block_a[m * k..].iter().all(|&v| v == sentinel));
                assert!(block_b[k * n..].iter().all(|&v| v == sentinel));
                let used = unpacked_len::<F32Packet, NR>(k);
                assert!(unpacked[used..].iter().all(|&v| v == sentinel));

                let expected = naive(&a, &b, m, k, n);
                for j in 0..n {
                    assert_eq!(&res[j * ld..j * ld + m], &expected[j * m..(j + 1) * m]);
                    assert!(res[j * ld + m..(j + 1) * ld].iter().all(|&v| v == sentinel));
                }
                assert!(res[ld * n..].iter().all(|&v| v == sentinel));
            }
        }
    }
}

#[test]
fn test_lhs_round_trip_with_conjugation() {
    type C = Complex<f64>;
    type P = <C as Scalar>::Packet;
    let mut rng = StdRng::seed_from_u64(12);
    let (rows, depth) = (9, 6);
    let a: Vec<C> = (0..rows * depth)
        .map(|_| C::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0)))
        .collect();

    let mut packed = vec![C::new(0.0, 0.0); rows * depth];
    unsafe {
        pack_lhs::<P, ColMajor, MR_PACKETS, true, false>(&mut packed, &a, rows, depth, rows, 0, 0);
    }

    let mr = mr::<P, MR_PACKETS>();
    let mut count = 0;
    for band in row_bands(rows, mr, <P as Packet>::LANES) {
        for k in 0..depth {
            for w in 0..band.height(mr, <P as Packet>::LANES) {
                let i = band.start() + w;
                assert_eq!(packed[count], a[k * rows + i].conj());
                count += 1;
            }
        }
    }
    assert_eq!(count, rows * depth);
}

#[test]
fn test_rhs_round_trip() {
    let mut rng = StdRng::seed_from_u64(13);
    let (depth, cols) = (5, 11);
    let b = random_f32(&mut rng, depth * cols);
    let mut b_row = vec![0.0; depth * cols];
    for j in 0..cols {
        for k in 0..depth {
            b_row[k * cols + j] = b[j * depth + k];
        }
    }

    let mut packed = vec![0.0; depth * cols];
    unsafe { pack_rhs::<f32, RowMajor, NR, false>(&mut packed, &b_row, cols, 1.0, depth, cols, 0, 0) };

    let mut count = 0;
    for tile in col_tiles(cols, NR) {
        for k in 0..depth {
            for c in 0..tile.width(NR) {
                assert_eq!(packed[count], b[(tile.start() + c) * depth + k]);
                count += 1;
            }
        }
    }
}

#[test]
fn test_packing_twice_is_identical() {
    let mut rng = StdRng::seed_from_u64(14);
    let (rows, depth, cols) = (19, 7, 10);
    let a = random_f32(&mut rng, rows * depth);
    let b = random_f32(&mut rng, depth * cols);

    let pack_both = || {
        let mut block_a = vec![0.0; rows * depth];
        let mut block_b = vec![0.0; depth * cols];
        unsafe {
            pack_lhs::<F32Packet, ColMajor, MR_PACKETS, false, false>(
                &mut block_a, &a, rows, depth, rows, 0, 0,
            );
            pack_rhs::<f32, ColMajor, NR, false>(&mut block_b, &b, depth, 0.5, depth, cols, 0, 0);
        }
        (block_a, block_b)
    };
    assert_eq!(pack_both(), pack_both());
}

#[test]
fn test_panel_mode_complementary_ranges() {
    let mut rng = StdRng::seed_from_u64(15);
    let (rows, depth, cols) = (13, 9, 7);
    let split = 4;
    let a = random_f32(&mut rng, rows * depth);
    let b = random_f32(&mut rng, depth * cols);
    let mut b_row = vec![0.0; depth * cols];
    for j in 0..cols {
        for k in 0..depth {
            b_row[k * cols + j] = b[j * depth + k];
        }
    }

    let mut whole_a = vec![0.0; rows * depth];
    let mut whole_b = vec![0.0; depth * cols];
    let mut split_a = vec![0.0; rows * depth];
    let mut split_b = vec![0.0; depth * cols];
    unsafe {
        pack_lhs::<F32Packet, ColMajor, MR_PACKETS, false, true>(
            &mut whole_a, &a, rows, depth, rows, depth, 0,
        );
        pack_lhs::<F32Packet, ColMajor, MR_PACKETS, false, true>(
            &mut split_a, &a, rows, split, rows, depth, 0,
        );
        pack_lhs::<F32Packet, ColMajor, MR_PACKETS, false, true>(
            &mut split_a, &a[split * rows..], rows, depth - split, rows, depth, split,
        );

        pack_rhs_row_major::<f32, NR, true>(&mut whole_b, &b_row, cols, 2.0, depth, cols, depth, 0);
        pack_rhs_row_major::<f32, NR, true>(&mut split_b, &b_row, cols, 2.0, split, cols, depth, 0);
        pack_rhs_row_major::<f32, NR, true>(
            &mut split_b,
            &b_row[split * cols..],
            cols,
            2.0,
            depth - split,
            cols,
            depth,
            split,
        );
    }
    assert_eq!(whole_a, split_a);
    assert_eq!(whole_b, split_b);

    // The kernel consumes the two depth ranges of one panel separately.
    let mut res = vec![0.0; rows * cols];
    let mut unpacked = vec![0.0; unpacked_len::<F32Packet, NR>(depth)];
    unsafe {
        gebp::<F32Packet, NoConj, MR_PACKETS, NR>(
            &mut res, rows, &whole_a, &whole_b, rows, split, cols,
            Some(depth), Some(depth), 0, 0, &mut unpacked,
        );
        gebp::<F32Packet, NoConj, MR_PACKETS, NR>(
            &mut res, rows, &whole_a, &whole_b, rows, depth - split, cols,
            Some(depth), Some(depth), split, split, &mut unpacked,
        );
    }
    let expected: Vec<f32> = naive(&a, &b, rows, depth, cols).iter().map(|v| 2.0 * v).collect();
    assert_eq!(res, expected);
}
