use syncplot::meta::RunMeta;
use syncplot::plot::parse_cli;
use syncplot::SyncIntervals;

fn main() {
    let (csvin, pngout) = parse_cli();
    if !csvin.is_file() {
        println!("Error: file not found: {}", csvin.display());
        return;
    }
    let meta = match RunMeta::from_csv(&csvin) {
        Ok(m) => m,
        Err(e) => {
            println!("Error: could not read metadata from {}: {}", csvin.display(), e);
            return;
        }
    };
    let syncintervals = match SyncIntervals::from_csv(&csvin) {
        Ok(s) => s,
        Err(e) => {
            println!("Error: could not read data from {}: {}", csvin.display(), e);
            return;
        }
    };
    if syncintervals.is_empty() {
        println!("No valid data found.");
        return;
    }
    println!(
        "read {} sync intervals from {} and plot to {}",
        syncintervals.len(),
        csvin.display(),
        pngout.display()
    );
    match syncintervals.plot_timeline(&meta, &pngout) {
        Ok(()) => println!("saved plot to {}", pngout.display()),
        Err(e) => println!("Error: could not plot to {}: {}", pngout.display(), e),
    }
}
