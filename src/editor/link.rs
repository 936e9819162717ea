//! Link group reconstruction.
//!
//! Levels store object links as a successor table: `link[i]` is the next
//! object in `i`'s chain, and `link[i] == i` means `i` is unlinked. Editors
//! show chains as numbered groups instead.

use crate::util::{Error, Result};

/// Assign a link group to each of `object_count` objects.
///
/// Groups are numbered from 1 in order of the first object of each chain;
/// unlinked objects get 0. Objects beyond the end of the table stay at 0.
/// A walk stops when it returns to its start, repeats the previous object,
/// or reaches an object already in the current group, so malformed chains
/// always terminate.
pub fn init_link_groups(link_table: &[u16], object_count: usize) -> Result<Vec<u32>> {
    let mut groups = vec![0u32; object_count];
    let mut current = 1u32;

    for i in 0..object_count.min(link_table.len()) {
        let first = link_table[i] as usize;
        if first == i {
            groups[i] = 0;
            continue;
        }
        if groups[i] != 0 {
            continue;
        }

        groups[i] = current;
        let mut prev = i;
        let mut next = first;
        while next != i && next != prev {
            let slot = groups
                .get_mut(next)
                .ok_or_else(|| Error::out_of_range("link", next, object_count))?;
            if *slot == current {
                break;
            }
            *slot = current;
            prev = next;
            next = *link_table
                .get(next)
                .ok_or_else(|| Error::out_of_range("link", next, link_table.len()))?
                as usize;
        }
        current += 1;
    }

    Ok(groups)
}

/// Rebuild a successor table from link groups.
///
/// Members of a group are chained in index order and the last one links back
/// to the first. Objects in group 0, and groups of one, link to themselves.
pub fn build_link_table(groups: &[u32]) -> Result<Vec<u16>> {
    let mut table: Vec<u16> = (0..groups.len())
        .map(|i| u16::try_from(i).map_err(|_| Error::invalid("too many objects to link")))
        .collect::<Result<_>>()?;

    let mut members: std::collections::BTreeMap<u32, Vec<usize>> = Default::default();
    for (i, &g) in groups.iter().enumerate().filter(|(_, g)| **g != 0) {
        members.entry(g).or_default().push(i);
    }
    for chain in members.values() {
        for (k, &i) in chain.iter().enumerate() {
            table[i] = chain[(k + 1) % chain.len()] as u16;
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_unlinked() {
        assert_eq!(init_link_groups(&[0, 1, 2, 3], 4).unwrap(), vec![0; 4]);
    }

    #[test]
    fn test_single_cycle() {
        // 1 -> 3 -> 4 -> 1
        let groups = init_link_groups(&[0, 3, 2, 4, 1], 5).unwrap();
        assert_eq!(groups, vec![0, 1, 0, 1, 1]);
    }

    #[test]
    fn test_two_cycles_in_first_occurrence_order() {
        let groups = init_link_groups(&[2, 3, 0, 1, 4], 5).unwrap();
        assert_eq!(groups, vec![1, 2, 1, 2, 0]);
    }

    #[test]
    fn test_short_table() {
        let groups = init_link_groups(&[1, 0], 4).unwrap();
        assert_eq!(groups, vec![1, 1, 0, 0]);
    }

    #[test]
    fn test_open_chain_terminates() {
        // 0 -> 1 -> 2 -> 1 never returns to 0
        let groups = init_link_groups(&[1, 2, 1], 3).unwrap();
        assert_eq!(groups, vec![1, 1, 1]);
        // A self-linked tail is reset when its own index is scanned
        let groups = init_link_groups(&[1, 2, 2], 3).unwrap();
        assert_eq!(groups, vec![1, 1, 0]);
    }

    #[test]
    fn test_link_out_of_range() {
        assert!(init_link_groups(&[5, 1], 2).is_err());
    }

    #[test]
    fn test_build_link_table() {
        let table = build_link_table(&[1, 2, 1, 2, 0, 3]).unwrap();
        assert_eq!(table, vec![2, 3, 0, 1, 4, 5]);
        assert_eq!(init_link_groups(&table, 6).unwrap(), vec![1, 2, 1, 2, 0, 0]);
    }
}
