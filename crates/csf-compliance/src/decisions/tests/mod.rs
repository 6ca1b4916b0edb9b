mod common;
mod evaluation;
mod routing;
