//! Scripted leaderboard site shared by the facade tests.

#![allow(dead_code)]

use statscout_page::testing::{FakePage, FakeSite};
use statscout_page::PageDefinition;
use statscout_scraper::{ScrapeSettings, WaitSettings};
use std::path::Path;
use std::time::Duration;

pub const PAGE_SIZE: usize = 10;

const SEASONS: [&str; 3] = ["2022", "2023", "2024"];
const POSITIONS: [&str; 3] = ["All", "C", "SS"];
const SPLITS: [&str; 3] = ["Full season", "Home", "Away"];
const TEAMS: [&str; 4] = ["NYY", "BOS", "TOR", "BAL"];

/// Page definition matching [`Leaderboard`]'s markup.
pub const DEFINITION: &str = r##"
[page]
id = "batting-leaders"
name = "Batting leaderboard"
url = "https://stats.example.com/leaders"
ready_selector = "#grid"
overlay_dismiss = ".ad-close"
submit_button = "#apply"

[filters.season1]
kind = "dropdown"
input = "#season1 input"
options = "#season1 li"
requires_submit = true

[filters.position]
kind = "selection"
options = ".pos-group button"

[filters.qualified]
kind = "switch"
control = "#qualified"
active_class = "on"

[filters.split]
kind = "native-dropdown"
select = "#split"

[quick_splits.last-7-days]
control = ".quick-split.l7"

[export]
method = "table"
table = "#grid"
cells = "td"

[[export.derived]]
column = "player_id"
selector = "a"
attribute = "href"
pattern = "playerid=(\\d+)"

[export.pagination]
next = ".pager .next"
total_pages = ".pager .total"
current_page = ".pager .current"
first = ".pager .first"
"##;

pub fn definition() -> PageDefinition {
    toml::from_str(DEFINITION).expect("parse leaderboard definition")
}

/// The same page exported through its own CSV download.
pub fn download_definition() -> PageDefinition {
    let source = DEFINITION.split("[export]").next().expect("definition head");
    toml::from_str(&format!(
        "{source}[export]\nmethod = \"download\"\ncontrol = \"#export\"\n"
    ))
    .expect("parse download definition")
}

pub fn settings(export_dir: &Path) -> ScrapeSettings {
    ScrapeSettings {
        wait: WaitSettings {
            timeout: Duration::from_millis(200),
            poll_interval: Duration::from_millis(1),
            settle_delay: Duration::ZERO,
        },
        export_dir: export_dir.to_path_buf(),
        ..ScrapeSettings::default()
    }
}

/// In-memory leaderboard with filters, an ad overlay and a paged grid.
#[derive(Debug, Clone)]
pub struct Leaderboard {
    pub season: usize,
    pub pending_season: usize,
    pub position: usize,
    pub qualified: bool,
    pub split: usize,
    pub page: usize,
    pub ad_visible: bool,
    pub renders_submit: bool,
    pub corrupt_download: bool,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self {
            season: 2,
            pending_season: 2,
            position: 0,
            qualified: false,
            split: 0,
            page: 1,
            ad_visible: true,
            renders_submit: true,
            corrupt_download: false,
        }
    }
}

impl Leaderboard {
    /// Rows matching the applied filters.
    pub fn row_count(&self) -> usize {
        let base = match self.position {
            0 => 23,
            1 => 7,
            _ => 12,
        };
        if self.qualified {
            base / 2
        } else {
            base
        }
    }

    pub fn total_pages(&self) -> usize {
        self.row_count().div_ceil(PAGE_SIZE).max(1)
    }

    fn rows(&self) -> Vec<[String; 5]> {
        (0..self.row_count())
            .map(|i| {
                [
                    (i + 1).to_string(),
                    format!(
                        "Player {}-{}-{i}",
                        SEASONS[self.season], POSITIONS[self.position]
                    ),
                    TEAMS[i % TEAMS.len()].to_string(),
                    (50 - i).to_string(),
                    (10_000 + i).to_string(),
                ]
            })
            .collect()
    }

    fn grid(&self) -> String {
        let body: String = self
            .rows()
            .into_iter()
            .skip((self.page - 1) * PAGE_SIZE)
            .take(PAGE_SIZE)
            .map(|[rank, name, team, hr, id]| {
                format!(
                    r#"<tr><td>{rank}</td><td><a href="/players?playerid={id}">{name}</a></td><td>{team}</td><td>{hr}</td></tr>
                    <tr class="spacer"></tr>"#
                )
            })
            .collect();

        format!(
            r#"<table id="grid">
                <thead><tr><th>#</th><th>Name</th><th>Team</th><th>HR</th></tr></thead>
                <tbody>{body}</tbody>
            </table>"#
        )
    }
}

impl FakeSite for Leaderboard {
    fn render(&self) -> String {
        let ad = if self.ad_visible {
            r#"<div class="ad"><button class="ad-close">close</button></div>"#
        } else {
            ""
        };
        let seasons: String = SEASONS.iter().map(|s| format!("<li>{s}</li>")).collect();
        let positions: String = POSITIONS
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let class = if i == self.position { r#" class="active""# } else { "" };
                format!("<button{class}>{p}</button>")
            })
            .collect();
        let splits: String = SPLITS
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let selected = if i == self.split { " selected" } else { "" };
                format!("<option{selected}>{s}</option>")
            })
            .collect();
        let switch = if self.qualified { "switch on" } else { "switch" };
        let submit = if self.renders_submit {
            r#"<button id="apply">Apply</button>"#
        } else {
            ""
        };

        format!(
            r#"<html><body>
            {ad}
            <div id="season1"><input value="{pending}"><ul>{seasons}</ul></div>
            <div class="pos-group">{positions}</div>
            <span id="qualified" class="{switch}"></span>
            <select id="split">{splits}</select>
            <a class="quick-split l7">Last 7 days</a>
            {submit}
            <button id="export">Export</button>
            <div class="pager"><a class="first">first</a><span class="current">{page}</span><span class="total">Page {page} of {total}</span><a class="next">next</a></div>
            {grid}
            </body></html>"#,
            pending = SEASONS[self.pending_season],
            page = self.page,
            total = self.total_pages(),
            grid = self.grid(),
        )
    }

    fn click(&mut self, selector: &str, index: usize) {
        if self.ad_visible && selector != ".ad-close" {
            return;
        }
        match selector {
            ".ad-close" => self.ad_visible = false,
            "#season1 li" => self.pending_season = index,
            ".pos-group button" => {
                self.position = index;
                self.page = 1;
            }
            "#qualified" => {
                self.qualified = !self.qualified;
                self.page = 1;
            }
            ".quick-split.l7" => {
                self.position = 0;
                self.qualified = true;
                self.page = 1;
            }
            "#apply" => {
                self.season = self.pending_season;
                self.page = 1;
            }
            ".pager .next" if self.page < self.total_pages() => self.page += 1,
            ".pager .first" => self.page = 1,
            _ => {}
        }
    }

    fn select(&mut self, selector: &str, index: usize) {
        if selector == "#split" {
            self.split = index;
        }
    }

    fn navigate(&mut self, _url: &str) {
        *self = Self {
            renders_submit: self.renders_submit,
            corrupt_download: self.corrupt_download,
            ..Self::default()
        };
    }

    fn download(&mut self, selector: &str) -> Option<String> {
        if selector != "#export" {
            return None;
        }
        if self.corrupt_download {
            return Some("#,Name,Team,HR\n1,Player\n".to_string());
        }
        let mut csv = String::from("#,Name,Team,HR\n");
        for [rank, name, team, hr, _] in self.rows() {
            csv.push_str(&format!("{rank},{name},{team},{hr}\n"));
        }
        Some(csv)
    }
}

pub fn fake_page(site: Leaderboard, download_dir: &Path) -> FakePage<Leaderboard> {
    FakePage::new(site).with_download_dir(download_dir)
}
