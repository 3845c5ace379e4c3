/// Linear counting estimate from the number of registers still at zero.
#[inline]
pub(crate) fn linear_counting(num_registers: usize, num_zero_registers: usize) -> f64 {
    debug_assert!(num_zero_registers > 0);
    let m = num_registers as f64;
    m * (m / num_zero_registers as f64).ln()
}
