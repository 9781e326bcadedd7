//! Identifier-to-path mapping
//!
//! The archive trie allows a short alphabetic prefix (up to three letters
//! before digits, or up to four letters plus underscore) and splits the
//! remainder into two-character directory segments, stopping at the period
//! that separates an accession from its version. The postings trie maps
//! each character of a lowercased term to one directory level.

/// Deterministic archive path for an identifier, e.g. NP_060051.2 maps to
/// NP_/06/00/51. Empty result rejects the identifier.
pub fn archive_trie(id: &str) -> Option<String> {
    if id.len() > 64 || id.is_empty() {
        return None;
    }

    let mut max = 4;
    let mut k = 0;
    for ch in id.chars() {
        if ch.is_alphabetic() {
            k += ch.len_utf8();
            continue;
        }
        if ch == '_' {
            k += 1;
            max = 6;
        }
        break;
    }

    // prefix keeps up to three letters before digits, or up to five letters
    // plus the underscore
    let mut pfx = &id[..k];
    let mut rest = id;
    if pfx.len() < max {
        rest = &id[k..];
    } else {
        pfx = "";
    }

    let mut path = String::with_capacity(id.len() * 2);

    if !pfx.is_empty() {
        path.push_str(pfx);
        path.push('/');
    }

    let mut between = 0;
    let mut do_slash = false;

    // remainder divides into character pairs
    for ch in rest.chars() {
        // the period separates accession from version
        if ch == '.' {
            break;
        }
        if do_slash {
            path.push('/');
            do_slash = false;
        }
        path.push(ch);
        between += 1;
        if between > 1 {
            do_slash = true;
            between = 0;
        }
    }

    if path.is_empty() {
        return None;
    }

    Some(path.to_uppercase())
}

/// Radix path for a postings term: one lowercased character per directory
/// level, spaces and other non-alphanumerics folded to underscore.
pub fn postings_trie(term: &str) -> Option<String> {
    if term.len() > 256 || term.is_empty() {
        return None;
    }

    let mut path = String::with_capacity(term.len() * 2);
    let mut do_slash = false;

    for ch in term.chars() {
        if do_slash {
            path.push('/');
        }
        let ch = if ch.is_alphanumeric() { ch } else { '_' };
        path.push(ch);
        do_slash = true;
    }

    Some(path.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accession_with_version() {
        assert_eq!(archive_trie("NP_060051.2").unwrap(), "NP_/06/00/51");
    }

    #[test]
    fn plain_numeric_identifier() {
        assert_eq!(archive_trie("6301692").unwrap(), "63/01/69/2");
    }

    #[test]
    fn short_letter_prefix() {
        assert_eq!(archive_trie("AAQ05867.1").unwrap(), "AAQ/05/86/7");
    }

    #[test]
    fn long_identifier_rejected() {
        let id = "X".repeat(65);
        assert!(archive_trie(&id).is_none());
    }

    #[test]
    fn trie_is_pure_and_distinct() {
        let ids = ["6301692", "6301693", "NP_060051.2", "NP_060052.2", "AAQ05867.1"];
        let mut paths = Vec::new();
        for id in ids {
            let a = archive_trie(id).unwrap();
            let b = archive_trie(id).unwrap();
            assert_eq!(a, b);
            paths.push(a);
        }
        let mut unique = paths.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), paths.len());
    }

    #[test]
    fn postings_path_folds_punctuation() {
        assert_eq!(postings_trie("heat shock").unwrap(), "h/e/a/t/_/s/h/o/c/k");
        assert_eq!(postings_trie("TNF-alpha").unwrap(), "t/n/f/_/a/l/p/h/a");
    }

    #[test]
    fn overlong_term_rejected() {
        let term = "t".repeat(257);
        assert!(postings_trie(&term).is_none());
    }
}
