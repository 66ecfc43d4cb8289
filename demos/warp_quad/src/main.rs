use argh::FromArgs;
use std::str::FromStr;
use warpgrid::{
    geometry::{HomographyEstimator, Point2, Quad, RenderMatrix},
    grid::{GridConfig, GridLayout, WarpMode, WarpedGrid},
    linalg::Tolerance,
};

#[derive(FromArgs)]
/// Estimate perspective warps and print them as CSS matrix3d values.
struct Args {
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Quad(QuadArgs),
    Grid(GridArgs),
}

#[derive(FromArgs)]
/// Warp a single rectangle onto a quadrilateral.
#[argh(subcommand, name = "quad")]
struct QuadArgs {
    /// width of the source rectangle
    #[argh(option, default = "100.0")]
    width: f64,

    /// height of the source rectangle
    #[argh(option, default = "100.0")]
    height: f64,

    /// destination corners as x0,y0,x1,y1,x2,y2,x3,y3 in clockwise order from top-left
    #[argh(option, default = "Corners::default()")]
    dst: Corners,

    /// zero-snapping tolerance
    #[argh(option, default = "warpgrid::linalg::DEFAULT_EPS")]
    eps: f64,

    /// decimal places used to print the homography
    #[argh(option, default = "6")]
    precision: usize,
}

#[derive(FromArgs)]
/// Animate a grid with the pointer over one item and print every frame.
#[argh(subcommand, name = "grid")]
struct GridArgs {
    /// container width
    #[argh(option, default = "300.0")]
    width: f64,

    /// element width
    #[argh(option, default = "100.0")]
    element_width: f64,

    /// element height
    #[argh(option, default = "100.0")]
    element_height: f64,

    /// number of items
    #[argh(option, default = "6")]
    items: usize,

    /// index of the hovered item
    #[argh(option, default = "4")]
    hover: usize,

    /// number of animation frames
    #[argh(option, default = "3")]
    frames: usize,

    /// push every lattice point away from the hovered item's centre
    #[argh(switch)]
    pointer_move: bool,
}

struct Corners(Quad);

impl Default for Corners {
    fn default() -> Self {
        Corners([(10.0, 10.0), (90.0, 5.0), (95.0, 95.0), (5.0, 90.0)].map(Point2::from))
    }
}

impl FromStr for Corners {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|v| v.trim().parse::<f64>().map_err(|e| format!("{v:?}: {e}")))
            .collect::<Result<Vec<_>, _>>()?;
        if values.len() != 8 {
            return Err(format!("expected 8 coordinates, got {}", values.len()));
        }
        Ok(Corners(std::array::from_fn(|i| {
            Point2::new(values[2 * i], values[2 * i + 1])
        })))
    }
}

fn css(m: &RenderMatrix) -> String {
    let values: Vec<String> = m.to_cols_array().iter().map(|v| format!("{v:.6}")).collect();
    format!("matrix3d({})", values.join(","))
}

fn run_quad(args: QuadArgs) -> Result<(), Box<dyn std::error::Error>> {
    let tol = Tolerance::new(args.eps);
    let (w, h) = (args.width, args.height);
    let src = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)].map(Point2::from);

    let homography = HomographyEstimator::new(tol).estimate(&src, &args.dst.0)?;
    println!("homography:");
    print!("{}", homography.to_matrix(tol)?.display(args.precision));

    let matrix = RenderMatrix::from(&homography);
    println!("transform: {}", css(&matrix));
    Ok(())
}

fn run_grid(args: GridArgs) -> Result<(), Box<dyn std::error::Error>> {
    let layout = GridLayout::new(args.width, args.element_width, args.element_height, args.items);
    let mode = match args.pointer_move {
        true => WarpMode::PointerMove,
        false => WarpMode::Rollover,
    };
    let config = GridConfig {
        mode,
        ..Default::default()
    };
    let mut grid = WarpedGrid::new(layout, config)?;

    let center = grid.item(args.hover)?.center();
    grid.hover_item(args.hover)?;
    grid.pointer_moved(center);

    for frame in 0..args.frames {
        grid.step();
        println!("frame {frame}:");
        for (i, result) in grid.render_frame().iter().enumerate() {
            match result {
                Ok(Some(m)) => println!("  item {i}: {}", css(m)),
                Ok(None) => println!("  item {i}: none"),
                Err(err) => println!("  item {i}: skipped ({err})"),
            }
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    match args.command {
        Command::Quad(args) => run_quad(args),
        Command::Grid(args) => run_grid(args),
    }
    .inspect_err(|err| log::error!("{err}"))
}
