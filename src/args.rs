use clap::Parser;

/// This is an instant-runoff tabulation program for fully ranked polls.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The table of ballots. The first row starts with `Timestamp` and names the candidates,
    /// every other row gives the rank (1 = most preferred) of each candidate for one voter.
    #[clap(value_parser)]
    pub input: String,

    /// (default csv, or xlsx for .xlsx files) The type of the input.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (strongest-loser or weakest-winner, default strongest-loser) The rule used to remove a candidate
    /// when no one holds a majority.
    #[clap(short, long, value_parser)]
    pub policy: Option<String>,

    /// If passed as an argument, the column titles are used as candidate names as they are, without removing
    /// the `Question [...]` decoration of online forms.
    #[clap(long, takes_value = false)]
    pub raw_labels: bool,

    /// (file path, 'stdout' or empty) If specified, the summary of the election will be written in JSON format to the given
    /// location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the outcome of an election in JSON format. If provided, the
    /// tabulated summary is checked against the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
