//! Static club configuration shown in profile forms and directory filters.

pub const POSITIONS: [&str; 4] = ["Goalkeeper", "Defender", "Midfielder", "Forward"];

pub const BOARD_POSITIONS: [&str; 4] = ["Captain", "President", "Treasurer", "Social Chair"];

pub const HOUSES: [&str; 28] = [
    "Quincy",
    "Adams",
    "Kirkland",
    "Eliot",
    "Dunster",
    "Leverett",
    "Lowell",
    "Mather",
    "Winthrop",
    "Cabot",
    "Currier",
    "Pforzheimer",
    "Canaday",
    "Grays",
    "Greenough",
    "Hollis",
    "Holworthy",
    "Hurlbut",
    "Lionel",
    "Mower",
    "Massachusetts Hall",
    "Matthews",
    "Pennypacker",
    "Stoughton",
    "Straus",
    "Thayer",
    "Weld",
    "Wigglesworth",
];

pub const FINAL_CLUBS: [&str; 9] = [
    "Fly Club",
    "Spee Club",
    "Porcellian Club",
    "A.D. Club",
    "Phoenix S.K. Club",
    "Owl Club",
    "Delphic Club",
    "Fox Club",
    "Sab Club",
];

/// Oldest graduating class offered in the directory filter.
pub const FIRST_GRADUATION_YEAR: i32 = 2017;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub houses: Vec<String>,
    pub final_clubs: Vec<String>,
    /// Newest first.
    pub graduation_years: Vec<String>,
}

pub fn filter_options(current_year: i32) -> FilterOptions {
    FilterOptions {
        houses: sorted(&HOUSES),
        final_clubs: sorted(&FINAL_CLUBS),
        graduation_years: (FIRST_GRADUATION_YEAR..=current_year)
            .rev()
            .map(|y| y.to_string())
            .collect(),
    }
}

fn sorted(values: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    out.sort();
    out
}
