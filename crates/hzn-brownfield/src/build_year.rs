use anyhow::{Context, Result};
use tracing::info;

use hzn_core::{Asset, Generator, Link, Network, Store};

/// Tag extendable assets of this horizon with `year`.
///
/// Extendable assets with a finite lifetime get `-{year}` appended to their
/// name (series columns follow) and a build year of `year` when none is set.
/// Returns the number of renamed assets.
pub fn add_build_year_to_new_assets(n: &mut Network, year: u32) -> Result<usize> {
    let renamed = tag_new::<Link>(n, year)? + tag_new::<Generator>(n, year)? + tag_new::<Store>(n, year)?;
    info!("tagged {} new assets with build year {}", renamed, year);
    Ok(renamed)
}

fn is_new<T: Asset>(asset: &T) -> bool {
    asset.extendable() && asset.lifetime().is_finite()
}

fn tag_new<T: Asset>(n: &mut Network, year: u32) -> Result<usize> {
    let table = T::table_mut(n);
    let renamed = table
        .rename_with(|asset| is_new(asset).then(|| format!("{}-{}", asset.name(), year)))
        .with_context(|| format!("renaming new {}", T::KIND.list_name()))?;
    for asset in table.iter_mut() {
        if is_new(asset) && asset.build_year() == 0 {
            asset.set_build_year(year);
        }
    }
    Ok(renamed)
}
