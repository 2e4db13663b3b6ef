use chrono::Duration;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::PathBuf;
pub mod meta;
pub mod plot;

pub const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

pub const TITLE: &str = "Software GenLock Runs (Chrony)";
pub const COMMENT_CHAR: u8 = b'#';
pub const SUBTITLE_WRAP_WIDTH: usize = 200;

// 10 x 6 inch figure rendered at 600 dpi
pub const PLOT_WIDTH: u32 = 6000;
pub const PLOT_HEIGHT: u32 = 3600;

/// The main struct for the synchronization interval time series
#[derive(Debug, Clone)]
pub struct SyncIntervals {
    pub time: Vec<i64>,
    pub interval: Vec<f64>,
}

impl SyncIntervals {
    pub fn new(capacity: usize) -> SyncIntervals {
        let time: Vec<i64> = Vec::with_capacity(capacity);
        let interval: Vec<f64> = Vec::with_capacity(capacity);
        let syncintervals: SyncIntervals = SyncIntervals { time, interval };
        syncintervals
    }

    /// Init a SyncIntervals from the data rows of a chrony sync csv,
    /// keeping the rows in file order.
    /// Comment rows, rows with fewer than two fields and rows whose
    /// time token or interval value do not parse are dropped;
    /// the metadata header is read separately, see meta::RunMeta.
    pub fn from_csv(fin: &PathBuf) -> Result<SyncIntervals, Box<dyn std::error::Error>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .comment(Some(COMMENT_CHAR))
            .from_path(fin)?;
        let mut syncintervals = SyncIntervals::new(10000 as usize);
        for record in reader.records() {
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    println!("could not read record: {}", e);
                    continue;
                }
            };
            if record.len() < 2 {
                continue;
            }
            let time = match parse_time_token(&record[0]) {
                Some(t) => t,
                None => continue,
            };
            let interval: f64 = match record[1].trim().parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            syncintervals.time.push(time);
            syncintervals.interval.push(interval);
        }
        Ok(syncintervals)
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// plots the sync interval time series to png,
    /// with the metadata subtitle under the title and, when the log
    /// configured a learning period, a dashed reference line at that level
    pub fn plot_timeline(
        &self,
        meta: &meta::RunMeta,
        fout: &PathBuf,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if self.is_empty() {
            return Err("no data points to plot".into());
        }
        let (xmin, xmax): (i64, i64) = min_and_max(&self.time[..]);
        let xspan = xmax - xmin;
        let xmargin = if xspan / 20 > 0 { xspan / 20 } else { 1 };
        let xmin = xmin - xmargin;
        let xmax = xmax + xmargin;
        let (ymin, ymax) = min_and_max(&self.interval[..]);
        let mut ymargin = (ymax - ymin) / 10f64;
        if ymargin == 0. {
            ymargin = 1.;
        }
        let ymin = ymin - ymargin;
        let ymax = ymax + ymargin;

        let root = BitMapBackend::new(fout, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
        root.fill(&WHITE)?;
        // font sizes picked for the 600 dpi canvas
        let mut area = root.titled(TITLE, ("sans-serif", 116))?;
        for subtitle_line in wrap_subtitle(&meta.subtitle(), SUBTITLE_WRAP_WIDTH) {
            area = area.titled(&subtitle_line, ("sans-serif", 75))?;
        }
        let mut chart = ChartBuilder::on(&area)
            .margin(40)
            .x_label_area_size(300)
            .y_label_area_size(420)
            .build_cartesian_2d(xmin..xmax, ymin..ymax)?;
        chart
            .configure_mesh()
            .light_line_style(&TRANSPARENT)
            .bold_line_style(RGBColor(150, 150, 150).stroke_width(2))
            .set_all_tick_mark_size(8)
            .label_style(("sans-serif", 83))
            .axis_desc_style(("sans-serif", 90))
            .x_desc("Timeline (From start of program)")
            .y_desc("Duration between each sync")
            .x_label_formatter(&|x: &i64| format_duration(*x))
            .y_label_formatter(&|y: &f64| format_duration(*y as i64))
            .draw()?;

        let series_color = RGBColor(31, 119, 180);
        chart.draw_series(LineSeries::new(
            self.time
                .iter()
                .zip(self.interval.iter())
                .map(|(x, y)| (*x, *y)),
            series_color.stroke_width(6),
        ))?;
        let points = self
            .time
            .iter()
            .zip(self.interval.iter())
            .map(|(x, y)| Circle::new((*x, *y), 14, series_color.filled()));
        chart.draw_series(points)?;

        if let Some(level) = meta.learning_period {
            chart
                .draw_series(DashedLineSeries::new(
                    vec![(xmin, level), (xmax, level)],
                    24,
                    18,
                    BLUE.stroke_width(5),
                ))?
                .label(format!("Learning Period = {}s", level as i64))
                .legend(|(x, y)| {
                    PathElement::new(vec![(x, y), (x + 80, y)], BLUE.stroke_width(5))
                });
            // annotation slightly below the line, near the end of the data
            let x_last = self.time.last().copied().unwrap_or(xmax);
            let annotation_style = TextStyle::from(("sans-serif", 66).into_font())
                .color(&BLUE)
                .pos(Pos::new(HPos::Right, VPos::Top));
            chart.draw_series(std::iter::once(Text::new(
                format!("Learning Period Range = {}s", level as i64),
                (x_last, level - 20.0),
                annotation_style,
            )))?;
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .label_font(("sans-serif", 75))
                .draw()?;
        }
        root.present()?;
        Ok(())
    }
}

impl std::fmt::Display for SyncIntervals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "time_s, sync_interval_s\n")?;
        for (t, i) in self.time.iter().zip(self.interval.iter()) {
            write!(f, "{},{}\n", t, i)?
        }
        Ok(())
    }
}

/// Extracts integer seconds from a time token like [+3232.56s],
/// rounding to the nearest second.
pub fn parse_time_token(token: &str) -> Option<i64> {
    let cleaned = token
        .trim()
        .trim_start_matches(|c| c == '[' || c == '+')
        .trim_end_matches(|c| c == 's' || c == ']');
    match cleaned.parse::<f64>() {
        Ok(v) => Some(v.round() as i64),
        Err(_) => None,
    }
}

/// Formats raw seconds as a compact duration for the axis ticks:
/// hours and minutes when nonzero, seconds only under one hour.
pub fn format_duration(seconds: i64) -> String {
    let d = Duration::seconds(seconds);
    let hours = d.num_hours();
    let minutes = d.num_minutes() - hours * 60;
    let secs = d.num_seconds() - d.num_minutes() * 60;
    let mut parts: Vec<String> = Vec::new();
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if secs > 0 && hours == 0 {
        parts.push(format!("{}s", secs));
    }
    parts.join(" ")
}

/// wraps the subtitle at word boundaries into lines of at most width chars,
/// words longer than width get a line of their own
pub fn wrap_subtitle(text: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(current);
            current = String::new();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub fn min_and_max<T: std::cmp::PartialOrd + Copy>(s: &[T]) -> (T, T) {
    let mut self_iter = s.iter();
    let (mut min, mut max) = match self_iter.next() {
        Some(v) => (*v, *v),
        None => panic!("could not iterate over slice"),
    };
    for es in self_iter {
        if *es > max {
            max = *es
        }
        if *es < min {
            min = *es
        }
    }
    return (min, max);
}
