#![allow(dead_code)]

use std::fs;
use std::path::Path;

use courtvision::config::{
    LoadConfig, GAMES_CSV, PLAYERS_CSV, PLAYER_STATISTICS_CSV, TEAM_STATISTICS_CSV,
};
use tempfile::TempDir;

pub const TEAM_STATISTICS: &str = "\
teamId,teamCity,teamName,gameDateTimeEst,win,teamScore,opponentScore
1610612747,Los Angeles,Lakers,2023-10-24 22:00:00,0,107,119
1610612743,Denver,Nuggets,2023-10-24 22:00:00,1,119,107
1610612747,Los Angeles,Lakers,2023-10-26 22:00:00,1,100,95
1610612756,Phoenix,Suns,2023-10-26 22:00:00,0,95,100
";

pub const PLAYERS: &str = "\
personId,firstName,lastName,birthdate,height,bodyWeight,lastAttended,country,draftYear,draftRound,draftNumber,guard,forward,center
2544,LeBron,James,1984-12-30,81,250,St. Vincent-St. Mary HS (OH),USA,2003,1,1,0,1,0
203999,Nikola,Jokic,1995-02-19,83,284,Mega Basket,Serbia,2014,2,41,0,0,1
203076,Anthony,Davis,1993-03-11,82,253,Kentucky,USA,2012,1,1,0,1,1
";

pub const GAMES: &str = "\
gameId,gameDateTimeEst,hometeamCity,hometeamName,awayteamCity,awayteamName,homeScore,awayScore,gameType,attendance,gameLabel,gameSubLabel
0022300061,2023-10-24 22:00:00,Denver,Nuggets,Los Angeles,Lakers,119,107,Regular Season,19842,,
0022300077,2023-10-26 22:00:00,Los Angeles,Lakers,Phoenix,Suns,100,95,Regular Season,18997,,
";

pub const PLAYER_STATISTICS_HEADER: &str = "firstName,lastName,playerteamCity,playerteamName,gameDateTimeEst,numMinutes,points,assists,reboundsTotal,steals,blocks,turnovers,fieldGoalsMade,fieldGoalsAttempted,threePointersMade,threePointersAttempted,freeThrowsMade,freeThrowsAttempted";

pub const PLAYER_STATISTICS_ROWS: &[&str] = &[
    "LeBron,James,Los Angeles,Lakers,2023-10-24 22:00:00,29,21,5,8,1,0,2,10,16,1,4,0,1",
    "LeBron,James,Los Angeles,Lakers,2023-10-26 22:00:00,35,27,7,6,2,1,3,11,20,2,5,3,4",
    "Nikola,Jokic,Denver,Nuggets,2023-10-24 22:00:00,36,29,11,13,1,1,2,12,20,1,3,4,4",
    "Anthony,Davis,Los Angeles,Lakers,2023-10-24 22:00:00,34,17,4,12,1,2,2,6,17,0,1,5,6",
    "Anthony,Davis,Los Angeles,Lakers,2023-10-26 22:00:00,35,24,3,9,0,3,1,10,18,0,0,4,4",
    "Victor,Nobody,Los Angeles,Lakers,2023-10-24 22:00:00,20,10,1,1,0,0,0,4,8,0,2,2,2",
];

pub fn player_statistics(rows: &[&str]) -> String {
    let mut csv = String::from(PLAYER_STATISTICS_HEADER);
    for row in rows {
        csv.push('\n');
        csv.push_str(row);
    }
    csv.push('\n');
    csv
}

/// Temporary dataset directory holding all four input files.
pub struct Dataset {
    pub dir: TempDir,
}

impl Dataset {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let dataset = Self { dir };
        dataset.write(TEAM_STATISTICS_CSV, TEAM_STATISTICS);
        dataset.write(PLAYERS_CSV, PLAYERS);
        dataset.write(GAMES_CSV, GAMES);
        dataset.write(PLAYER_STATISTICS_CSV, &player_statistics(PLAYER_STATISTICS_ROWS));
        dataset
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, file: &str, contents: &str) {
        fs::write(self.dir.path().join(file), contents).unwrap();
    }

    pub fn remove(&self, file: &str) {
        fs::remove_file(self.dir.path().join(file)).unwrap();
    }

    pub fn config(&self) -> LoadConfig {
        LoadConfig {
            data_dir: self.path().to_path_buf(),
            ..LoadConfig::default()
        }
    }
}
