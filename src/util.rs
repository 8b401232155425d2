/// Reverses the `bits` least significant bits of `index`.
///
/// The remaining bits of `index` must be zero.
pub fn bit_reverse(index: usize, bits: usize) -> usize {
    debug_assert!(bits == usize::BITS as usize || index >> bits == 0);
    if bits == 0 {
        return 0;
    }
    index.reverse_bits() >> (usize::BITS as usize - bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_three_bits() {
        let reversed: Vec<_> = (0..8).map(|j| bit_reverse(j, 3)).collect();
        assert_eq!(reversed, vec![0, 4, 2, 6, 1, 5, 3, 7]);
    }

    #[test]
    fn reverse_is_involution() {
        for bits in 1..=10 {
            for j in 0..(1 << bits) {
                assert_eq!(bit_reverse(bit_reverse(j, bits), bits), j);
            }
        }
    }

    #[test]
    fn zero_bits() {
        assert_eq!(bit_reverse(0, 0), 0);
    }
}
