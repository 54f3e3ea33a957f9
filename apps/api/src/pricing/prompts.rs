// Vision prompt for /analyze-image.
// The summary it produces is fed to heuristics::detect_cues, so it asks the
// model to use the same condition vocabulary the cue regexes look for.

pub const YARD_VISION_PROMPT: &str = "You are looking at a photo of a residential yard \
    taken by a lawn-care salesperson before quoting a job. In 3 to 5 short sentences, \
    describe: overall condition (use words like tidy, manicured, overgrown, patchy, weeds, \
    debris, bare or dead spots where they apply); visible features that could be sold as \
    extra services (flower beds, mulch, hedges, shrubs, edging, leaves, aeration); and \
    anything that makes the job risky or slow (slopes, obstacles, pets, erosion). \
    Do not guess square footage. Do not quote prices. Plain text only.";
