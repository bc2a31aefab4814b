use crate::model::{Candidate, SourceTag};
use std::collections::HashSet;
use tracing::trace;

/// Union of every source's hostnames. `results` must be in fetch order: the
/// first source listing a hostname keeps it, later sightings are dropped.
pub fn aggregate(results: Vec<(SourceTag, Vec<String>)>) -> Vec<Candidate> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut candidates = Vec::new();

    for (source, hostnames) in results {
        for hostname in hostnames {
            if seen.insert(hostname.clone()) {
                candidates.push(Candidate { hostname, source });
            } else {
                trace!("{} already collected, skip {} sighting", hostname, source);
            }
        }
    }

    candidates
}
