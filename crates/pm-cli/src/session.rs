//! The question-and-answer loop.
//!
//! One round asks for a start and an end location, snaps either one onto the
//! road network if it is an isolated landmark, prints the shortest path, and
//! asks whether to go again.  End of input at any prompt ends the session
//! without error.

use std::io::{self, BufRead, Write};

use tracing::debug;

use pm_core::NodeId;
use pm_spatial::{
    DijkstraRouter, MatchKind, Resolution, Resolver, ResolverConfig, RoadGraph, Router, SpatialError,
    format_path,
};

/// Interactive shortest-path dialog over one loaded graph.
pub struct Session<'g, R, W> {
    graph:    &'g RoadGraph,
    resolver: Resolver<'g>,
    router:   DijkstraRouter,
    input:    R,
    out:      W,
}

impl<'g, R: BufRead, W: Write> Session<'g, R, W> {
    pub fn new(graph: &'g RoadGraph, config: ResolverConfig, input: R, out: W) -> Self {
        Self {
            graph,
            resolver: Resolver::new(graph, config),
            router: DijkstraRouter,
            input,
            out,
        }
    }

    /// Answer routing queries until the user declines another one or input
    /// runs out.
    ///
    /// # Errors
    ///
    /// Only I/O failures on the reader or writer.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.out, "\n--- Find shortest path ---")?;
            let Some(start) = self.prompt_node("Starting location")? else { return Ok(()) };
            let Some(end) = self.prompt_node("Ending location")? else { return Ok(()) };

            // An endpoint that cannot be snapped abandons the round.
            let Some(start) = self.onto_road(start)? else { continue };
            let Some(end) = self.onto_road(end)? else { continue };

            self.report_route(start, end)?;

            write!(self.out, "\nFind another path? (y/n): ")?;
            self.out.flush()?;
            match self.read_line()? {
                Some(reply) if !reply.starts_with(['n', 'N']) => {}
                _ => return Ok(()),
            }
        }
    }

    /// Ask for one location until it resolves to a node.  `None` on end of
    /// input.
    fn prompt_node(&mut self, label: &str) -> io::Result<Option<NodeId>> {
        loop {
            write!(self.out, "{label} (ID or name): ")?;
            self.out.flush()?;
            let Some(token) = self.read_line()? else { return Ok(None) };

            let resolution = self.resolver.resolve(&token);
            let (kind, nodes, truncated) = match &resolution {
                Resolution::Id(id) => return Ok(Some(*id)),
                Resolution::NotFound => {
                    writeln!(self.out, "No location matches '{token}'.")?;
                    continue;
                }
                Resolution::Candidates { kind, nodes, truncated } => (*kind, nodes, *truncated),
            };

            if kind == MatchKind::Fuzzy {
                writeln!(self.out, "No exact match for '{token}'. Showing similar names.")?;
            }
            debug!(%token, ?kind, matches = nodes.len(), truncated, "location candidates");

            let limit = self.resolver.config().menu_limit;
            let menu = resolution.menu(limit);
            if let [only] = nodes.as_slice() {
                writeln!(self.out, "Found: {} (ID: {})", only.name().unwrap_or_default(), only.id)?;
            } else {
                writeln!(self.out, "Found {} results:", nodes.len())?;
            }
            for (i, node) in menu.iter().enumerate() {
                writeln!(self.out, "{}. {} (ID: {})", i + 1, node.name().unwrap_or_default(), node.id)?;
            }
            if nodes.len() > menu.len() {
                writeln!(self.out, "... and {} more.", nodes.len() - menu.len())?;
            }
            if truncated {
                writeln!(self.out, "(search stopped after {} matches)", nodes.len())?;
            }

            write!(self.out, "Choose 1-{} or 0 to re-enter: ", menu.len())?;
            self.out.flush()?;
            let Some(reply) = self.read_line()? else { return Ok(None) };
            let choice = reply.trim().parse::<usize>().unwrap_or(0);
            if let Some(id) = resolution.select(choice, limit) {
                return Ok(Some(id));
            }
        }
    }

    /// Replace an isolated node with the nearest road node, telling the user.
    /// `None` abandons the round.
    fn onto_road(&mut self, id: NodeId) -> io::Result<Option<NodeId>> {
        let snap = self.resolver.snap_to_road(id);
        if matches!(snap, Ok(s) if !s.moved()) {
            return Ok(Some(id));
        }

        let name = self.graph.find_by_id(id).and_then(|n| n.name()).unwrap_or("unnamed");
        match snap {
            Ok(snap) => {
                writeln!(self.out, "\nNode {id} ({name}) is not on a road. Snapping to the nearest road node...")?;
                writeln!(self.out, "Snapped to node {} ({:.2} m away).", snap.road_node, snap.distance_m)?;
                Ok(Some(snap.road_node))
            }
            Err(SpatialError::NoRoadNodes) => {
                writeln!(self.out, "\nNode {id} ({name}) is not on a road. Snapping to the nearest road node...")?;
                writeln!(self.out, "No road node found nearby.")?;
                Ok(None)
            }
            Err(e) => {
                writeln!(self.out, "{e}")?;
                Ok(None)
            }
        }
    }

    fn report_route(&mut self, start: NodeId, end: NodeId) -> io::Result<()> {
        let path = self.router.route(self.graph, start, end);
        match path.distance() {
            Some(distance_m) => {
                writeln!(self.out, "\nShortest path length: {distance_m:.2} m")?;
                writeln!(self.out, "Path: {}", format_path(self.graph, &path))?;
            }
            None => writeln!(self.out, "\nNo path found between {start} and {end}.")?,
        }
        Ok(())
    }

    /// Next input line without its terminator.  `None` at end of input.
    ///
    /// Bytes that are not valid UTF-8 become U+FFFD, so a console in a legacy
    /// code page yields a token that simply matches nothing.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        let text = String::from_utf8_lossy(&buf);
        Ok(Some(text.trim_end_matches(['\r', '\n']).to_owned()))
    }
}
