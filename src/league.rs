use tracing::debug;

use crate::knowledge_base::KnowledgeBase;

/// League named in the text, else the one shared by every known team.
///
/// Teams spread over several leagues resolve to the combined-leagues label.
pub fn resolve_league(kb: &KnowledgeBase, text: &str, teams: &[String]) -> Option<String> {
    if let Some(league) = kb.league_patterns().first_match(text) {
        debug!(league = %league, "league from text");
        return Some(league.clone());
    }

    let mut leagues: Vec<&str> = Vec::new();
    for team in teams {
        if let Some(league) = kb.lookup_team_league(team)
            && !leagues.contains(&league)
        {
            leagues.push(league);
        }
    }
    match leagues.as_slice() {
        [] => None,
        [only] => Some(only.to_string()),
        _ => {
            debug!(leagues = ?leagues, "teams span several leagues");
            Some(kb.combined_league().to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge_base::fixtures::tiny;

    fn teams(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn explicit_text_wins_over_teams() {
        let kb = tiny();
        let league = resolve_league(&kb, "arsenal in la liga", &teams(&["Arsenal"]));
        assert_eq!(league.as_deref(), Some("ESP-La Liga"));
    }

    #[test]
    fn table_order_decides_between_keywords() {
        let kb = tiny();
        let league = resolve_league(&kb, "la liga or the premier league", &[]);
        assert_eq!(league.as_deref(), Some("ENG-Premier League"));
    }

    #[test]
    fn single_league_inferred_from_teams() {
        let kb = tiny();
        let league = resolve_league(&kb, "", &teams(&["Arsenal", "Liverpool"]));
        assert_eq!(league.as_deref(), Some("ENG-Premier League"));
    }

    #[test]
    fn mixed_leagues_use_combined_label() {
        let kb = tiny();
        let league = resolve_league(&kb, "", &teams(&["Arsenal", "Barcelona"]));
        assert_eq!(league.as_deref(), Some("Big 5 European Leagues Combined"));
    }

    #[test]
    fn unknown_leagues_give_none() {
        let kb = tiny();
        assert_eq!(resolve_league(&kb, "", &teams(&["Testers United"])), None);
        assert_eq!(resolve_league(&kb, "", &[]), None);
    }

    #[test]
    fn teams_without_league_are_skipped() {
        let kb = tiny();
        let league = resolve_league(&kb, "", &teams(&["Testers United", "Barcelona"]));
        assert_eq!(league.as_deref(), Some("ESP-La Liga"));
    }
}
