use bus_provision::{
    FlatLines, LineMap, LineResolver, Provisioner, RawBusConfig,
    BUS_COUNT_MAX,
};
use clap::Parser;
use i2c_gpio_host::params::{parse_bus, parse_controller};
use i2c_gpio_host::platform::{PinRegistry, PlatformRegistry};
use i2c_gpio_host::{DRIVER_NAME, LOADER_NAME, VERSION};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "i2c-gpio-custom",
    about = "Provisions bit-banged I2C bus instances from integer tuples"
)]
struct Args {
    /// Bus slot 0: id,data,clock[,udelay,timeout,data_od,clock_od,clock_oo]
    #[arg(long, value_name = "TUPLE")]
    bus0: Option<String>,
    /// Bus slot 1, same format as --bus0
    #[arg(long, value_name = "TUPLE")]
    bus1: Option<String>,
    /// Bus slot 2, same format as --bus0
    #[arg(long, value_name = "TUPLE")]
    bus2: Option<String>,
    /// Bus slot 3, same format as --bus0
    #[arg(long, value_name = "TUPLE")]
    bus3: Option<String>,
    /// Line controller as label:base:count; may be repeated
    #[arg(long = "controller", value_name = "CTRL")]
    controllers: Vec<String>,
    /// Treat global line numbers as controller offsets directly
    #[arg(long)]
    direct: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!("{} version {}", LOADER_NAME, VERSION);

    let mut configs = [RawBusConfig::empty(); BUS_COUNT_MAX];
    let tuples = [&args.bus0, &args.bus1, &args.bus2, &args.bus3];
    for (slot, tuple) in tuples.into_iter().enumerate() {
        if let Some(tuple) = tuple {
            configs[slot] = parse_bus(tuple)
                .map_err(|e| format!("bus{}: {}", slot, e))?;
        }
    }

    let flat;
    let mut map = LineMap::new();
    let resolver: &dyn LineResolver = if args.direct {
        flat = match FlatLines::new("gpio") {
            Some(flat) => flat,
            None => return Err("controller label too long".into()),
        };
        &flat
    } else {
        if args.controllers.is_empty() {
            return Err("no line controllers declared; \
                        pass --controller label:base:count or --direct"
                .into());
        }
        for decl in &args.controllers {
            let (label, base, count) = parse_controller(decl)?;
            map.add(&label, base, count)
                .map_err(|e| format!("controller {}: {}", label, e))?;
        }
        &map
    };

    let mut tables = PinRegistry::new();
    let mut devices = PlatformRegistry::new();

    let run = Provisioner::new(DRIVER_NAME, resolver, &mut tables, &mut devices)
        .run(&configs);
    let mut provisioned = match run {
        Ok(set) => set,
        Err(err) => {
            error!("{}", err);
            std::process::exit(1);
        }
    };

    for bus in provisioned.iter() {
        info!("bus {} up as {}", bus.id, bus.dev_id);
    }
    info!("{} bus(es) provisioned", provisioned.len());

    provisioned.teardown(&mut tables, &mut devices);
    info!("torn down");
    Ok(())
}
