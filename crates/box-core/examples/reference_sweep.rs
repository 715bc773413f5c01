//! Sweeps a reference driver through the three enclosure topologies and
//! prints a few landmarks of each response.
//!
//! Run with:
//!   cargo run -p box-core --example reference_sweep

use box_core::{
    CabinetSpec, DriverParams, EnclosureSpec, FrequencyResponse, PortShape, PortSpec, SimRequest,
};

fn peak_below(response: &FrequencyResponse, limit: f64) -> Option<(f64, f64)> {
    response
        .frequencies
        .iter()
        .zip(&response.impedance)
        .filter(|(f, _)| **f < limit)
        .map(|(f, z)| (*f, *z))
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

fn main() {
    println!("=== Enclosure Sweep ===");

    let driver = DriverParams {
        re: 6.0,
        le: 0.5e-3,
        qes: 0.4,
        qms: 5.0,
        fs: 40.0,
        vas: 0.05,
        cms: 0.5e-3,
        mms: 0.02,
        bl: 8.0,
        sd: 0.02,
        rms: None,
        z: None,
    };
    let cabinet = CabinetSpec::Dimensions {
        lx: 0.3,
        ly: 0.4,
        lz: 0.5,
    };
    let enclosures = [
        EnclosureSpec::OpenAir,
        EnclosureSpec::Sealed {
            cabinet: cabinet.clone(),
        },
        EnclosureSpec::Ported {
            cabinet,
            port: PortSpec {
                length: 0.15,
                shape: PortShape::Circular { diameter: 0.07 },
            },
        },
    ];

    for enclosure in enclosures {
        let request = SimRequest::new(driver.clone(), enclosure);
        let response = match box_core::compute(&request) {
            Ok(response) => response,
            Err(e) => {
                eprintln!("{}: {e}", request.enclosure.scenario());
                continue;
            }
        };

        println!("\n[{}] {} points", response.scenario, response.len());
        if let Some(fb) = response.tuning_frequency {
            println!("  tuning frequency: {fb:.2} Hz");
        }
        if let Some((f, z)) = peak_below(&response, 200.0) {
            println!("  impedance peak below 200 Hz: {z:.2} Ω at {f:.1} Hz");
        }
        for target in [20.0, 50.0, 100.0, 1000.0, 10_000.0] {
            let idx = response
                .frequencies
                .partition_point(|&f| f < target)
                .min(response.len() - 1);
            println!(
                "  {:>8.1} Hz  SPL {:6.2} dB  |Z| {:6.2} Ω  Lw {:6.2} dB",
                response.frequencies[idx], response.spl[idx], response.impedance[idx], response.power[idx]
            );
        }
    }
}
