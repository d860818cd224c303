pub mod lat_lon;
pub mod turbine;
