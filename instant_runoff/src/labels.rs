use log::{debug, warn};

/// Turns decorated column titles into candidate names.
///
/// Online forms export a ranking grid as one column per candidate, titled
/// `<question> [<candidate>]`. When every label carries exactly one `[`, the
/// number of characters in front of the `[` of the first label is dropped
/// from every label, along with the `[` itself and the last character.
/// Otherwise the labels are returned untouched.
pub(crate) fn decode_labels(labels: &[String]) -> Vec<String> {
    let decorated = labels.iter().all(|l| l.matches('[').count() == 1);
    if !decorated {
        warn!(
            "decode_labels: candidate labels do not all contain exactly one '[', keeping them as they are: {:?}",
            labels
        );
        return labels.to_vec();
    }

    let prefix_len = labels
        .first()
        .map(|l| l.chars().take_while(|c| *c != '[').count())
        .unwrap_or(0);
    debug!("decode_labels: prefix length: {}", prefix_len);

    labels
        .iter()
        .map(|l| {
            let mut name: String = l.chars().skip(prefix_len + 1).collect();
            name.pop();
            name
        })
        .collect()
}
