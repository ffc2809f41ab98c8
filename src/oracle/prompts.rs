pub(super) const HOSTED_SCORE: &str = r#"Rate this car photo for social media appeal (Instagram/TikTok) on a scale of 1-100.

TECHNICAL REQUIREMENTS (must pass or score drops to 30 or below):
- Photo must be sharp and in focus
- Subject must be clearly visible
- No excessive blur or camera shake
- Acceptable exposure (not too dark/bright to see details)

CONTENT EVALUATION (if technical requirements are met):
- Is there a clear, interesting car as the main subject?
- Is the car well-lit and prominently featured?
- Is the background clean or does it add to the photo?
- Would this stop someone scrolling on social media?
- Does it showcase the car's best features?
- Is the composition engaging?

HEAVY PENALTIES for:
- Blurry, out-of-focus, or unclear subjects
- Photos that are mostly parking lot/background
- Distant cars that aren't the clear focus
- Cluttered scenes where the car gets lost
- Poor lighting on the car itself
- Boring angles or compositions

A blurry photo of a Ferrari should score lower than a sharp photo of a Camry.

Respond with ONLY a JSON object:
{
  "score": [1-100],
  "reasoning": "Brief explanation of why this score",
  "main_subject": "What is the primary subject of this photo",
  "social_media_appeal": "Why this would/wouldn't work for social media",
  "improvements": "What could make this photo better",
  "caption": "Ready-to-use Instagram/social media caption with relevant hashtags"
}"#;

pub(super) const LOCAL_SCORE: &str = "Rate this car photo for social media appeal on a scale of 1-100.

TECHNICAL REQUIREMENTS FIRST:
- Photo must be sharp and clear
- Subject must be in focus
- No excessive blur or camera shake
- Proper exposure (can see details)

If photo fails technical requirements, score 30 or below.

IF TECHNICAL QUALITY IS GOOD, then consider:
- Clear, interesting car as main subject
- Good lighting on the car
- Clean or interesting background
- Eye-catching composition
- Would make people stop scrolling

Avoid:
- Blurry or out-of-focus photos
- Mostly parking lot/background
- Distant, unclear cars
- Cluttered, busy scenes
- Poor car lighting
- Boring compositions

Remember: A sharp photo of an average car beats a blurry photo of an amazing car for social media.

Give a score 1-100 and brief reasoning. Focus on social media appeal, not just technical quality.

Also create a ready-to-use social media caption with relevant hashtags for this photo.";

pub(super) const COMPARE: &str = "Compare these two car photos. Are they similar shots of the same car/subject from similar angles?

Consider them SIMILAR only if:
- Same specific car, similar angle/composition
- Multiple shots of the exact same vehicle with minor differences
- Same scene with only small changes in framing

Consider them DIFFERENT if:
- Different cars entirely (even if similar models)
- Same car but very different angles (front vs rear, close-up vs wide shot)
- Different scenes/locations
- One shows interior, other shows exterior
- Significantly different compositions

Be CONSERVATIVE - when in doubt, consider them DIFFERENT.

Respond with only: SIMILAR or DIFFERENT";
