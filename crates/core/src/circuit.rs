use crate::directory::RegisteredNode;
use onionet_common::NodeId;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur while selecting a circuit
#[derive(Debug, Error)]
pub enum CircuitError {
    #[error("Insufficient nodes available: {available} < {required}")]
    InsufficientNodes { available: usize, required: usize },
}

/// Select `hop_count` pairwise-distinct relays uniformly at random.
///
/// Distinctness is by node id, so a registry that holds duplicate
/// registrations for the same id still counts it once. Selection is
/// bounded: each slot filters out already-chosen ids and picks from the
/// remainder, so no retry loop can run forever.
///
/// The returned order is the sampling order; the wrapper reverses it
/// after sealing to designate the entry node.
pub fn build_circuit(
    candidates: &[RegisteredNode],
    hop_count: usize,
) -> Result<Vec<RegisteredNode>, CircuitError> {
    let distinct: HashSet<NodeId> = candidates.iter().map(|n| n.node_id).collect();
    if distinct.len() < hop_count {
        return Err(CircuitError::InsufficientNodes {
            available: distinct.len(),
            required: hop_count,
        });
    }

    let mut rng = rand::thread_rng();
    let mut circuit: Vec<RegisteredNode> = Vec::with_capacity(hop_count);

    while circuit.len() < hop_count {
        let available: Vec<&RegisteredNode> = candidates
            .iter()
            .filter(|n| !circuit.iter().any(|chosen| chosen.node_id == n.node_id))
            .collect();

        let node = match available.choose(&mut rng) {
            Some(node) => (*node).clone(),
            None => {
                return Err(CircuitError::InsufficientNodes {
                    available: distinct.len(),
                    required: hop_count,
                })
            }
        };

        circuit.push(node);
    }

    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(ids: &[u16]) -> Vec<RegisteredNode> {
        ids.iter()
            .map(|&id| RegisteredNode {
                node_id: NodeId(id),
                pub_key: format!("key-{id}"),
            })
            .collect()
    }

    #[test]
    fn circuit_has_three_distinct_nodes() {
        let candidates = nodes(&[0, 1, 2, 3, 4]);

        for _ in 0..50 {
            let circuit = build_circuit(&candidates, 3).unwrap();
            assert_eq!(circuit.len(), 3);

            let unique: HashSet<_> = circuit.iter().map(|n| n.node_id).collect();
            assert_eq!(unique.len(), 3);
        }
    }

    #[test]
    fn fails_with_too_few_nodes() {
        let candidates = nodes(&[0, 1]);

        let err = build_circuit(&candidates, 3).unwrap_err();
        assert!(matches!(
            err,
            CircuitError::InsufficientNodes {
                available: 2,
                required: 3
            }
        ));
    }

    #[test]
    fn duplicate_registrations_count_once() {
        let mut candidates = nodes(&[0, 1]);
        candidates.push(RegisteredNode {
            node_id: NodeId(0),
            pub_key: "key-0-again".into(),
        });

        assert!(build_circuit(&candidates, 3).is_err());
    }

    #[test]
    fn exact_candidate_count_uses_all_nodes() {
        let candidates = nodes(&[7, 8, 9]);
        let circuit = build_circuit(&candidates, 3).unwrap();

        let ids: HashSet<_> = circuit.iter().map(|n| n.node_id.value()).collect();
        assert_eq!(ids, HashSet::from([7, 8, 9]));
    }

    #[test]
    fn supports_other_hop_counts() {
        let candidates = nodes(&[0, 1, 2, 3, 4]);
        let circuit = build_circuit(&candidates, 5).unwrap();
        assert_eq!(circuit.len(), 5);
    }
}
