use anyhow::Result;
use epidata::{EpiDataContext, EpiRange};

fn main() -> Result<()> {
    // Fetch national ILINet data for the 2015/16 season in the classic
    // message format.
    let ctx = EpiDataContext::from_env()?;

    let call = ctx.pub_fluview(
        "nat",
        EpiRange::new("201540", "201620")?,
        None,
        None,
        None,
    )?;

    let response = ctx.classic(&call)?;
    println!("result={} message={}", response.result, response.message);
    for row in &response.epidata {
        println!("{:?} wili={:?}", row.get("epiweek"), row.get("wili"));
    }

    Ok(())
}
