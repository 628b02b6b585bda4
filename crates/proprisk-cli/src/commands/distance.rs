//! Distance command implementation

use crate::cli::DistanceArgs;
use crate::output::OutputWriter;
use crate::output_types::DistanceOutput;
use anyhow::Result;
use proprisk_geo::{distance_meters, validate_lon_lat, DistanceMethod};

pub fn execute(args: DistanceArgs, output: &OutputWriter) -> Result<()> {
    let method = if args.euclidean { DistanceMethod::Euclidean } else { DistanceMethod::Geodesic };
    if method == DistanceMethod::Geodesic {
        validate_lon_lat(args.lon1, args.lat1)?;
        validate_lon_lat(args.lon2, args.lat2)?;
    }

    let meters = distance_meters((args.lat1, args.lon1), (args.lat2, args.lon2), method);
    let result = DistanceOutput { method, meters, kilometers: meters / 1000.0 };

    if output.is_json() {
        output.result(result)?;
    } else {
        output.kv("Method", format!("{:?}", result.method));
        output.kv("Distance", format!("{:.1} m ({:.3} km)", result.meters, result.kilometers));
    }
    Ok(())
}
