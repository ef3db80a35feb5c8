use uuid::Uuid;

use crimson_club::models::{
    FormLetter, GameResult, MemberProfile, MemberRole, SeasonGameRecord, TeamRecord,
};
use crimson_club::stats::{
    CompletionBand, completion_band, completion_tip, profile_completion, recent_form, team_record,
};

fn game(date: &str, result: Option<GameResult>) -> SeasonGameRecord {
    SeasonGameRecord {
        home_team: "Harvard".to_string(),
        away_team: "Opponent".to_string(),
        date: date.to_string(),
        time: None,
        score: None,
        result,
    }
}

#[test]
fn record_counts_each_result_once() {
    let games = vec![
        game("2024-01-01", Some(GameResult::Win)),
        game("2024-03-01", Some(GameResult::Loss)),
        game("2024-02-01", Some(GameResult::Tie)),
        game("2024-04-01", None),
    ];
    let record = team_record(&games);
    assert_eq!(
        record,
        TeamRecord {
            wins: 1,
            losses: 1,
            ties: 1
        }
    );
    assert_eq!(record.to_string(), "1-1-1");
    assert_eq!(team_record(&[]).to_string(), "0-0-0");
}

#[test]
fn form_is_most_recent_first() {
    let games = vec![
        game("2024-01-01", Some(GameResult::Win)),
        game("2024-03-01", Some(GameResult::Loss)),
        game("2024-02-01", Some(GameResult::Tie)),
    ];
    let form = recent_form(&games)
        .into_iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>();
    assert_eq!(form, vec!["L", "T", "W"]);
}

#[test]
fn form_keeps_five_and_skips_unplayed() {
    let mut games = (1..=7)
        .map(|day| game(&format!("2024-10-{day:02}"), Some(GameResult::Win)))
        .collect::<Vec<_>>();
    games.push(game("2024-10-09", Some(GameResult::Loss)));
    games.push(game("2024-10-20", None));
    games.push(game("sometime", Some(GameResult::Tie)));

    let form = recent_form(&games);
    assert_eq!(form.len(), 5);
    assert_eq!(form[0], FormLetter::L);
    assert!(form[1..].iter().all(|f| *f == FormLetter::W));
    assert!(recent_form(&[]).is_empty());
}

#[test]
fn form_orders_mixed_date_formats() {
    let games = vec![
        game("09/14/2024", Some(GameResult::Win)),
        game("September 21, 2024", Some(GameResult::Loss)),
        game("2024-09-07T15:00:00Z", Some(GameResult::Tie)),
    ];
    assert_eq!(
        recent_form(&games),
        vec![FormLetter::L, FormLetter::W, FormLetter::T]
    );
}

fn six_of_fourteen() -> MemberProfile {
    let mut p = MemberProfile::new(Uuid::new_v4(), "Jane Doe", MemberRole::CurrentPlayer);
    p.email = Some("jane@college.edu".to_string());
    p.graduation_year = Some(2026);
    p.position = Some("Forward".to_string());
    p.house = Some("Kirkland".to_string());
    p.concentration = Some("Economics".to_string());
    p.bio = Some("   ".to_string());
    p
}

#[test]
fn completion_rounds_share_of_tracked_fields() {
    let p = six_of_fourteen();
    assert_eq!(profile_completion(&p), 43);
    assert_eq!(completion_band(43), CompletionBand::Medium);
}

#[test]
fn alumni_track_three_more_fields() {
    let mut p = six_of_fourteen();
    p.role = Some(MemberRole::Alumni);
    // 6 of 17
    assert_eq!(profile_completion(&p), 35);
    p.current_job = Some("Analyst".to_string());
    p.current_company = Some("Acme".to_string());
    p.current_location = Some("Boston".to_string());
    // 9 of 17
    assert_eq!(profile_completion(&p), 53);
}

#[test]
fn zero_graduation_year_counts_as_present() {
    let mut p = MemberProfile::new(Uuid::new_v4(), "Jane Doe", MemberRole::CurrentPlayer);
    let without = profile_completion(&p);
    p.graduation_year = Some(0);
    assert!(profile_completion(&p) > without);
}

#[test]
fn full_profile_is_complete() {
    let mut p = six_of_fourteen();
    p.bio = Some("Midfield engine.".to_string());
    p.hometown = Some("Austin, TX".to_string());
    p.final_club = Some("Fly".to_string());
    p.profile_image_url = Some("https://cdn.example.com/a/b.png".to_string());
    p.linkedin_url = Some("https://linkedin.com/in/jane".to_string());
    p.instagram_url = Some("https://instagram.com/jane".to_string());
    p.board_position = Some("Captain".to_string());
    p.phone_number = Some("(617) 555-0100".to_string());
    assert_eq!(profile_completion(&p), 100);
    assert_eq!(completion_band(100), CompletionBand::High);
    assert_eq!(completion_tip(&p), "Your profile is looking great!");
}

#[test]
fn tip_points_at_first_missing_field() {
    let mut p = six_of_fourteen();
    assert_eq!(completion_tip(&p), "Add a profile photo");
    p.profile_image_url = Some("https://cdn.example.com/a/b.png".to_string());
    assert_eq!(completion_tip(&p), "Add your bio");
    assert_eq!(completion_band(10), CompletionBand::Low);
}
