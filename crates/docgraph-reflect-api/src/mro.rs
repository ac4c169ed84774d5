//! C3 linearization shared by providers that compute method resolution
//! order themselves.

/// Merge step of C3
///
/// Returns `None` when the sequences admit no consistent order.
pub fn c3_merge<T: Clone + PartialEq>(mut sequences: Vec<Vec<T>>) -> Option<Vec<T>> {
    let mut result = Vec::new();

    loop {
        sequences.retain(|sequence| !sequence.is_empty());
        if sequences.is_empty() {
            return Some(result);
        }

        let candidate = sequences
            .iter()
            .map(|sequence| &sequence[0])
            .find(|head| {
                !sequences
                    .iter()
                    .any(|sequence| sequence[1..].contains(head))
            })?
            .clone();

        for sequence in sequences.iter_mut() {
            if sequence[0] == candidate {
                sequence.remove(0);
            }
        }
        result.push(candidate);
    }
}

/// Linearize `head` given the linearizations of its bases, in base order
pub fn c3_linearize<T: Clone + PartialEq>(
    head: T,
    base_mros: Vec<Vec<T>>,
    bases: Vec<T>,
) -> Option<Vec<T>> {
    let mut sequences = base_mros;
    sequences.push(bases);
    let mut merged = c3_merge(sequences)?;
    merged.insert(0, head);
    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_inheritance() {
        let mro = c3_linearize("B", vec![vec!["A", "object"]], vec!["A"]).unwrap();
        assert_eq!(mro, vec!["B", "A", "object"]);
    }

    #[test]
    fn test_diamond() {
        // class A; class B(A); class C(A); class D(B, C)
        let a = vec!["A", "object"];
        let b = c3_linearize("B", vec![a.clone()], vec!["A"]).unwrap();
        let c = c3_linearize("C", vec![a], vec!["A"]).unwrap();
        let d = c3_linearize("D", vec![b, c], vec!["B", "C"]).unwrap();
        assert_eq!(d, vec!["D", "B", "C", "A", "object"]);
    }

    #[test]
    fn test_inconsistent_order() {
        // class X(A, B) and class Y(B, A) cannot share a subclass
        let a = vec!["A", "object"];
        let b = vec!["B", "object"];
        let x = c3_linearize("X", vec![a.clone(), b.clone()], vec!["A", "B"]).unwrap();
        let y = c3_linearize("Y", vec![b, a], vec!["B", "A"]).unwrap();
        assert!(c3_linearize("Z", vec![x, y], vec!["X", "Y"]).is_none());
    }
}
