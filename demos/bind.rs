use std::collections::BTreeMap;

use chrono_tz::Tz;
use dragon_bind::{Bindable, Binder, Constructor, Context, Properties, Shape, TypeDescriptor, Value};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct Server {
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    zone: Option<Tz>,
    routes: Vec<Route>,
    limits: BTreeMap<String, u32>,
}

fn default_port() -> u16 {
    80
}

impl Bindable for Server {
    fn shape() -> Shape {
        Shape::composite::<Self>(|| {
            TypeDescriptor::new("Server").constructor(
                Constructor::new("Server")
                    .field::<String>("host")
                    .optional::<u16>("port")
                    .field::<Option<Tz>>("zone")
                    .field::<Vec<Route>>("routes")
                    .field::<BTreeMap<String, u32>>("limits"),
            )
        })
    }
}

#[derive(Debug, Deserialize)]
struct Route {
    path: String,
    methods: Vec<Method>,
}

impl Bindable for Route {
    fn shape() -> Shape {
        Shape::composite::<Self>(|| {
            TypeDescriptor::new("Route").constructor(
                Constructor::new("Route")
                    .field::<String>("path")
                    .field::<Vec<Method>>("methods"),
            )
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
enum Method {
    Get,
    Post,
}

impl Bindable for Method {
    fn shape() -> Shape {
        Shape::enumeration::<Self>(&["GET", "POST"])
    }
}

fn main() -> Result<(), dragon_bind::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut properties = Properties::from_file("demos/app.toml", true)?;
    properties.merge(Properties::from_file("demos/local.toml", false)?);

    let context = Context::builder(properties.clone())
        .with_map_keys(properties.keys())
        .build();
    let binder = Binder::new();

    let server: Server = binder.create("server", &context)?;
    println!("Server: {}:{} ({:?})", server.host, server.port, server.zone);
    for route in &server.routes {
        println!("  route {} {:?}", route.path, route.methods);
    }
    println!("  limits {:?}", server.limits);

    // Untyped sections keep whatever structure the file has.
    let features: BTreeMap<String, Value> = binder.create("features", &context)?;
    for (name, feature) in &features {
        println!("Feature {name}: {feature}");
    }

    Ok(())
}
