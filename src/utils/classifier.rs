#![forbid(unsafe_code)]

use std::fmt;

// ***************************************************************************
//                                  Types
// ***************************************************************************
// ---------------------------------------------------------------------------
// Property:
// ---------------------------------------------------------------------------
/// Tags reported in a classification's property list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Armstrong,
    Even,
    Odd,
}

impl Property {
    pub fn as_str(&self) -> &'static str {
        match self {
            Property::Armstrong => "armstrong",
            Property::Even => "even",
            Property::Odd => "odd",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Classification:
// ---------------------------------------------------------------------------
/// Everything we compute about a number locally.  The fun fact comes from
/// the Numbers API and is attached by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub number: u64,
    pub is_prime: bool,
    pub is_perfect: bool,
    pub properties: Vec<Property>,
    pub digit_sum: u64,
}

// ***************************************************************************
//                             Public Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// classify:
// ---------------------------------------------------------------------------
pub fn classify(n: u64) -> Classification {
    Classification {
        number: n,
        is_prime: is_prime(n),
        is_perfect: is_perfect(n),
        properties: properties(n),
        digit_sum: digit_sum(n),
    }
}

// ---------------------------------------------------------------------------
// is_prime:
// ---------------------------------------------------------------------------
/** Trial division up to the integer square root.  The loop bound is written
 * as i <= n / i so that i * i never overflows.
 */
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    let mut i: u64 = 2;
    while i <= n / i {
        if n % i == 0 {
            return false;
        }
        i += 1;
    }
    true
}

// ---------------------------------------------------------------------------
// is_perfect:
// ---------------------------------------------------------------------------
/** A number is perfect when the sum of its proper divisors equals the number.
 * Divisors are collected in pairs (i, n/i) up to the square root, with 1
 * always included.  0 and 1 are never perfect.
 */
pub fn is_perfect(n: u64) -> bool {
    if n <= 1 {
        return false;
    }

    // Divisor sums of large u64 values can exceed u64::MAX.
    let target = n as u128;
    let mut sum: u128 = 1;
    let mut i: u64 = 2;
    while i <= n / i {
        if n % i == 0 {
            sum += i as u128;
            let pair = n / i;
            if pair != i {
                sum += pair as u128;
            }
            if sum > target {
                return false;
            }
        }
        i += 1;
    }
    sum == target
}

// ---------------------------------------------------------------------------
// is_armstrong:
// ---------------------------------------------------------------------------
/** True when the sum of each digit raised to the digit count equals n.
 * Every single digit number, 0 included, qualifies.
 */
pub fn is_armstrong(n: u64) -> bool {
    let digits = to_digits(n);
    let power = digits.len() as u32;

    // 20 * 9^20 fits comfortably in a u128.
    let sum: u128 = digits.iter().map(|d| (*d as u128).pow(power)).sum();
    sum == n as u128
}

// ---------------------------------------------------------------------------
// digit_sum:
// ---------------------------------------------------------------------------
pub fn digit_sum(n: u64) -> u64 {
    to_digits(n).iter().map(|d| *d as u64).sum()
}

// ---------------------------------------------------------------------------
// properties:
// ---------------------------------------------------------------------------
/** The armstrong tag, when it applies, always precedes the parity tag. */
pub fn properties(n: u64) -> Vec<Property> {
    let mut props = Vec::with_capacity(2);
    if is_armstrong(n) {
        props.push(Property::Armstrong);
    }
    if n % 2 == 0 {
        props.push(Property::Even);
    } else {
        props.push(Property::Odd);
    }
    props
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// to_digits:
// ---------------------------------------------------------------------------
/** Base-10 digits, most significant first.  Zero yields a single 0 digit. */
fn to_digits(n: u64) -> Vec<u8> {
    if n == 0 {
        return vec![0];
    }

    let mut digits = Vec::with_capacity(20);
    let mut rest = n;
    while rest > 0 {
        digits.push((rest % 10) as u8);
        rest /= 10;
    }
    digits.reverse();
    digits
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    fn tags(n: u64) -> Vec<&'static str> {
        properties(n).iter().map(|p| p.as_str()).collect()
    }

    #[test]
    fn digits_are_most_significant_first() {
        assert_eq!(to_digits(0), vec![0]);
        assert_eq!(to_digits(7), vec![7]);
        assert_eq!(to_digits(1204), vec![1, 2, 0, 4]);
        assert_eq!(to_digits(u64::MAX).len(), 20);
    }

    #[test]
    fn prime_matches_brute_force() {
        for n in 0..2000u64 {
            let expected = n >= 2 && (2..n).all(|d| n % d != 0);
            assert_eq!(is_prime(n), expected, "is_prime({})", n);
        }
    }

    #[test]
    fn prime_large_values() {
        assert!(is_prime(2_147_483_647));
        assert!(!is_prime(2_147_483_649));
        // 4294967311 is the first prime past u32::MAX.
        assert!(is_prime(4_294_967_311));
        assert!(!is_prime(4_294_967_297)); // 641 * 6700417
    }

    #[test]
    fn perfect_numbers() {
        assert!(is_perfect(6));
        assert!(is_perfect(28));
        assert!(is_perfect(496));
        assert!(is_perfect(8128));
        assert!(is_perfect(33_550_336));
        assert!(!is_perfect(0));
        assert!(!is_perfect(1));
        assert!(!is_perfect(12));
        assert!(!is_perfect(27));
        // Perfect squares must count their root once.
        assert!(!is_perfect(16));
    }

    #[test]
    fn perfect_matches_brute_force() {
        for n in 0..3000u64 {
            let expected = n > 1 && (1..n).filter(|d| n % d == 0).sum::<u64>() == n;
            assert_eq!(is_perfect(n), expected, "is_perfect({})", n);
        }
    }

    #[test]
    fn armstrong_numbers() {
        for n in 0..10 {
            assert!(is_armstrong(n), "single digit {}", n);
        }
        assert!(is_armstrong(153));
        assert!(is_armstrong(370));
        assert!(is_armstrong(371));
        assert!(is_armstrong(407));
        assert!(is_armstrong(9474));
        assert!(!is_armstrong(10));
        assert!(!is_armstrong(123));
        assert!(!is_armstrong(9475));
        assert!(!is_armstrong(u64::MAX));
    }

    #[test]
    fn digit_sums() {
        assert_eq!(digit_sum(0), 0);
        assert_eq!(digit_sum(9), 9);
        assert_eq!(digit_sum(12345), 15);
        assert_eq!(digit_sum(1000), 1);
        assert_eq!(digit_sum(u64::MAX), 87);
    }

    #[test]
    fn property_order() {
        assert_eq!(tags(4), vec!["even"]);
        assert_eq!(tags(153), vec!["armstrong", "odd"]);
        assert_eq!(tags(28), vec!["even"]);
        assert_eq!(tags(0), vec!["armstrong", "even"]);
        assert_eq!(tags(371), vec!["armstrong", "odd"]);
        assert_eq!(tags(11), vec!["odd"]);
    }

    #[test]
    fn classify_is_repeatable() {
        for n in [0u64, 1, 2, 6, 28, 153, 9474, 1_000_003] {
            assert_eq!(classify(n), classify(n));
        }
    }

    #[test]
    fn classify_fields() {
        let c = classify(28);
        assert_eq!(c.number, 28);
        assert!(!c.is_prime);
        assert!(c.is_perfect);
        assert_eq!(c.properties, vec![Property::Even]);
        assert_eq!(c.digit_sum, 10);
    }
}
