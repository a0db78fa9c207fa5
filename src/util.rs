/// Cuts `label` to `max_chars` characters and appends an ellipsis when it was
/// longer.
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    match label.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &label[..cut]),
        None => label.to_owned(),
    }
}

pub fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_labels_are_untouched() {
        assert_eq!(truncate_label("Ops", 16), "Ops");
        assert_eq!(truncate_label("exactly sixteen!", 16), "exactly sixteen!");
    }

    #[test]
    fn long_labels_are_cut_on_char_boundaries() {
        assert_eq!(truncate_label("ünïcödé-heavy label", 7), "ünïcödé…");
    }

    #[test]
    fn plural_picks_the_right_form() {
        assert_eq!(plural(1, "node", "nodes"), "1 node");
        assert_eq!(plural(3, "node", "nodes"), "3 nodes");
    }
}
