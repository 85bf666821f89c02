//! Award validation hashes (`v` parameter).
//!
//! The service recomputes these digests and rejects an award whose `v` does
//! not match, so the byte sequence fed to MD5 must stay exactly as below.
//! The hardcore flag always enters the hash as `1` or `0`.

fn flag(hardcore: bool) -> &'static str {
    if hardcore {
        "1"
    } else {
        "0"
    }
}

/// MD5 of `{id}{username}{h}{id}` as lowercase hex.
pub fn award_achievement(achievement_id: u32, username: &str, hardcore: bool) -> String {
    let input = format!("{achievement_id}{username}{}{achievement_id}", flag(hardcore));
    format!("{:x}", md5::compute(input.as_bytes()))
}

/// MD5 of every id (decimal, no separators), then `username`, then `h`.
pub fn award_achievements(achievement_ids: &[u32], username: &str, hardcore: bool) -> String {
    let mut input: String = achievement_ids.iter().map(u32::to_string).collect();
    input.push_str(username);
    input.push_str(flag(hardcore));
    format!("{:x}", md5::compute(input.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_award_golden_vector() {
        assert_eq!(
            award_achievement(32123, "TimmoneSimmons", true),
            "f4061a12710a0b39a9d07c960c3f4365"
        );
    }

    #[test]
    fn batch_award_golden_vector() {
        assert_eq!(
            award_achievements(&[483244, 483245, 483246], "TimmoneSimmons", true),
            "a7ac631302e34eee7b840b6e6c77ebed"
        );
    }

    #[test]
    fn softcore_batch_hashes_zero_flag() {
        assert_eq!(
            award_achievements(&[483244, 483245, 483246], "TimmoneSimmons", false),
            "057908960bcfb206b25c019a7c860843"
        );
    }

    #[test]
    fn hardcore_flag_changes_digest() {
        assert_ne!(
            award_achievement(32123, "TimmoneSimmons", true),
            award_achievement(32123, "TimmoneSimmons", false)
        );
    }

    #[test]
    fn batch_hash_covers_whole_sequence_once() {
        // One id in a batch hashes "{id}{user}{h}", which differs from the
        // single-award layout.
        let batch = award_achievements(&[32123], "TimmoneSimmons", true);
        assert_eq!(batch, "27eace80302659f15fa2f2b16f557dfc");
        assert_ne!(batch, award_achievement(32123, "TimmoneSimmons", true));
    }
}
